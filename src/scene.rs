use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::camera::Camera;
use crate::consts::{ FOCAL_LENGTH, VIEWPORT_HEIGHT };
use crate::surface::Surface;
use crate::vector::Vector;

/// Everything a render needs: the image dimensions, the surfaces to test
/// rays against, and the camera that fires them.
///
/// Read-only for the duration of a render; the pipeline borrows the scene
/// and never mutates it.
pub struct Scene {
    pub width: usize,
    pub height: usize,
    pub surfaces: Vec<Surface>,
    pub camera: Camera,
}

impl Scene {
    /// Loads a scene description from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        let scene_json: SceneJson = serde_json::from_str(&text)?;

        Ok(scene_json.into())
    }

    /// The built-in scene: one small sphere ahead of the camera and one
    /// very large sphere below it acting as the ground (+y is down).
    pub fn default_scene(height: usize, aspect_ratio: f64) -> Scene {
        let width = (height as f64 * aspect_ratio) as usize;

        Scene {
            width,
            height,
            surfaces: vec![
                Surface::sphere(Vector::new(0.0, 0.0, 1.0), 0.5),
                Surface::sphere(Vector::new(0.0, 100.6, 1.0), 100.0),
            ],
            camera: Camera::new(VIEWPORT_HEIGHT,
                VIEWPORT_HEIGHT * aspect_ratio, FOCAL_LENGTH),
        }
    }
}

impl From<SceneJson> for Scene {
    fn from(scene_json: SceneJson) -> Scene {
        let width = (scene_json.image_height as f64
            * scene_json.aspect_ratio) as usize;

        let mut camera = Camera::new(
            scene_json.viewport_height,
            scene_json.viewport_height * scene_json.aspect_ratio,
            scene_json.focal_length,
        );
        camera.location = (&scene_json.camera_location).into();

        let surfaces = scene_json.spheres.iter()
            .map(|s| Surface::sphere((&s.center).into(), s.radius))
            .collect();

        Scene {
            width,
            height: scene_json.image_height,
            surfaces,
            camera,
        }
    }
}

/// The serialized form of a scene description.
#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    image_height: usize,
    aspect_ratio: f64,

    viewport_height: f64,
    focal_length: f64,

    #[serde(default)]
    camera_location: Vec<f64>,

    spheres: Vec<SphereJson>,
}

#[derive(Clone, Serialize, Deserialize)]
struct SphereJson {
    center: Vec<f64>,
    radius: f64,
}

/* Tests */

#[test]
fn parse_scene_description() {
    let text = r#"{
        "image_height": 9,
        "aspect_ratio": 1.0,
        "viewport_height": 2.0,
        "focal_length": 1.0,
        "spheres": [
            { "center": [0.0, 0.0, 1.0], "radius": 0.5 },
            { "center": [0.0, 100.6, 1.0], "radius": 100.0 }
        ]
    }"#;

    let scene: Scene = serde_json::from_str::<SceneJson>(text)
        .unwrap()
        .into();

    assert_eq!(scene.width, 9);
    assert_eq!(scene.height, 9);
    assert_eq!(scene.surfaces.len(), 2);
    assert_eq!(scene.camera.viewport_width, 2.0);
    assert_eq!(scene.camera.location, Vector::zero());

    let Surface::Sphere(small) = scene.surfaces[0];
    assert_eq!(small.center, Vector::new(0.0, 0.0, 1.0));
    assert_eq!(small.radius, 0.5);
}

#[test]
fn parse_scene_with_camera_location() {
    let text = r#"{
        "image_height": 4,
        "aspect_ratio": 2.0,
        "viewport_height": 1.0,
        "focal_length": 1.5,
        "camera_location": [0.0, -1.0, -3.0],
        "spheres": []
    }"#;

    let scene: Scene = serde_json::from_str::<SceneJson>(text)
        .unwrap()
        .into();

    assert_eq!(scene.width, 8);
    assert_eq!(scene.camera.location, Vector::new(0.0, -1.0, -3.0));
    assert_eq!(scene.camera.focal_length, 1.5);
    assert!(scene.surfaces.is_empty());
}

#[test]
fn default_scene_contents() {
    let scene = Scene::default_scene(711, 16.0 / 9.0);

    assert_eq!(scene.width, 1264);
    assert_eq!(scene.height, 711);
    assert_eq!(scene.surfaces.len(), 2);
    assert_eq!(scene.camera.viewport_height, 2.0);
    assert!(crate::feq(scene.camera.viewport_width, 2.0 * 16.0 / 9.0));
}
