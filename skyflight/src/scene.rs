//! Per-frame render snapshot. Everything here is plain glam data for the
//! host's renderer; nothing in the simulation reads it back.

use celestial::{BodyView, Indicator, OrbitalSystem};
use chase_camera::CameraPose;
use color::Color;
use craft::Craft;
use glam::{Quat, Vec3};
use nalgebra::Vector3;
use rotations::prelude::*;
use std::f64::consts::FRAC_PI_2;

use crate::assets::CraftModel;

pub fn to_vec3(v: &Vector3<f64>) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

pub fn to_quat(q: &UnitQuaternion) -> Quat {
    Quat::from_xyzw(q.x() as f32, q.y() as f32, q.z() as f32, q.w() as f32).normalize()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CraftNode {
    pub transform: Transform,
    /// False until the model has loaded.
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraNode {
    pub position: Vec3,
    pub rotation: Quat,
    pub forward: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingNode {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Lies in the body's equatorial plane.
    pub rotation: Quat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyNode {
    pub name: String,
    /// Scale is the body's radius.
    pub transform: Transform,
    pub color: [f32; 4],
    pub ring: Option<RingNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorNode {
    pub name: String,
    pub base: Vec3,
    pub cap: Vec3,
    pub cap_radius: f32,
    pub label: Vec3,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub craft: CraftNode,
    pub camera: CameraNode,
    pub sun: BodyNode,
    pub sun_light_intensity: f32,
    pub bodies: Vec<BodyNode>,
    pub indicators: Vec<IndicatorNode>,
}

impl FrameSnapshot {
    pub fn capture(
        craft: &Craft,
        model: &CraftModel,
        camera: &CameraPose,
        system: &OrbitalSystem,
    ) -> Self {
        Self {
            craft: CraftNode {
                transform: Transform {
                    translation: to_vec3(&craft.position()),
                    rotation: to_quat(&craft.orientation()),
                    scale: model.scale() as f32,
                },
                visible: model.is_visible(),
            },
            camera: CameraNode {
                position: to_vec3(&camera.position),
                rotation: to_quat(&camera.orientation),
                forward: to_vec3(&camera.forward),
            },
            sun: sun_node(system),
            sun_light_intensity: system.sun_light_intensity() as f32,
            bodies: system.bodies().map(|b| body_node(&b)).collect(),
            indicators: system.indicators().iter().map(indicator_node).collect(),
        }
    }

    pub fn body(&self, name: &str) -> Option<&BodyNode> {
        self.bodies.iter().find(|b| b.name == name)
    }
}

fn sun_node(system: &OrbitalSystem) -> BodyNode {
    BodyNode {
        name: celestial::SUN.to_string(),
        transform: Transform {
            translation: Vec3::ZERO,
            rotation: to_quat(&system.sun_orientation()),
            scale: system.sun_radius() as f32,
        },
        color: color_array(&system.sun_color()),
        ring: None,
    }
}

fn body_node(body: &BodyView<'_>) -> BodyNode {
    let ring = body.config.ring.map(|ring| {
        // ring geometry is built in the XY plane, turn it flat onto the equator
        let flat = UnitQuaternion::from_axis_angle(&Vector3::x(), FRAC_PI_2);
        RingNode {
            inner_radius: ring.inner_radius as f32,
            outer_radius: ring.outer_radius as f32,
            rotation: to_quat(&(body.orientation * flat)),
        }
    });

    BodyNode {
        name: body.config.name.clone(),
        transform: Transform {
            translation: to_vec3(&body.position),
            rotation: to_quat(&body.orientation),
            scale: body.radius as f32,
        },
        color: color_array(&body.config.color),
        ring,
    }
}

fn indicator_node(indicator: &Indicator) -> IndicatorNode {
    IndicatorNode {
        name: indicator.name.clone(),
        base: to_vec3(&indicator.position),
        cap: to_vec3(&indicator.cap_position()),
        cap_radius: indicator.cap_radius as f32,
        label: to_vec3(&indicator.label_position()),
        color: color_array(&indicator.color),
    }
}

fn color_array(color: &Color) -> [f32; 4] {
    color.into()
}
