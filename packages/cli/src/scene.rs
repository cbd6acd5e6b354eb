//! Sample object graph shown by the CLI.

use inspector_reflection::{reflect_struct, CappedVec, FieldAttributes, Opaque, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Default)]
pub struct Light {
    pub intensity: f32,
    pub color: String,
    pub cast_shadows: bool,
}

reflect_struct! {
    Light {
        intensity => FieldAttributes::new().label("Intensity").handler("Slider"),
        color => FieldAttributes::new().label("Color"),
        cast_shadows => FieldAttributes::new().label("Cast Shadows"),
    }
}

#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub exposure: f64,
    pub layers: Vec<String>,
    pub lights: Vec<Light>,
    pub tags: BTreeMap<String, i32>,
    pub cameras: CappedVec<String>,
    pub falloff: Opaque<Curve>,
    pub revision: u32,
}

reflect_struct! {
    Scene {
        name => FieldAttributes::new().label("Name"),
        exposure => FieldAttributes::new().label("Exposure").handler("SpinBox"),
        layers => FieldAttributes::new().label("Layers"),
        lights => FieldAttributes::new().label("Lights"),
        tags => FieldAttributes::new().label("Tags"),
        cameras => FieldAttributes::new().label("Cameras"),
        falloff => FieldAttributes::new().label("Falloff"),
        revision => FieldAttributes::new().visibility(Visibility::Hide),
    }
}

pub fn sample() -> Scene {
    Scene {
        name: "courtyard".into(),
        exposure: 1.0,
        layers: vec!["base".into(), "props".into()],
        lights: vec![
            Light {
                intensity: 2.5,
                color: "#ffeedd".into(),
                cast_shadows: true,
            },
            Light {
                intensity: 0.4,
                color: "#3344ff".into(),
                cast_shadows: false,
            },
        ],
        tags: BTreeMap::from([("outdoor".to_string(), 1)]),
        cameras: CappedVec::from_vec(vec!["main".into()], 2),
        falloff: Opaque(Curve {
            points: vec![(0.0, 1.0), (1.0, 0.0)],
        }),
        revision: 1,
    }
}
