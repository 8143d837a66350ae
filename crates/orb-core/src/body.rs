// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid bodies and the definitions used to create them.

use orb_geom::{Bounds, Pose, ProxyId, Quat, Shape, Vec3};
use serde::{Deserialize, Serialize};

/// Creation parameters for a [`Body`].
///
/// Missing JSON fields fall back to [`BodyDef::default`]: a unit-mass,
/// unit-radius sphere at rest at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodyDef {
    /// Mass in kilograms. Zero or negative mass makes the body immovable.
    pub mass: f64,
    /// Restitution coefficient, combined pairwise by the narrow phase.
    pub bounce: f64,
    /// Friction coefficient. Stored and combined for hosts; resolution
    /// ignores it.
    pub friction: f64,
    /// World position.
    pub position: Vec3,
    /// Orientation. A zero quaternion is replaced by identity.
    pub rotation: Quat,
    /// Initial linear velocity.
    pub velocity: Vec3,
    /// Initial angular velocity (stored, not integrated).
    pub angular_velocity: Vec3,
    /// Collision geometry.
    pub shape: Shape,
    /// Static bodies never integrate and never receive corrections.
    pub is_static: bool,
    /// Kinematic bodies integrate but never receive corrections.
    pub is_kinematic: bool,
    /// Sleeping bodies skip integration until woken.
    pub is_asleep: bool,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            mass: 1.0,
            bounce: 0.0,
            friction: 0.0,
            position: Vec3::ZERO,
            rotation: Quat::identity(),
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            shape: Shape::sphere(1.0),
            is_static: false,
            is_kinematic: false,
            is_asleep: false,
        }
    }
}

impl BodyDef {
    /// Sphere of the given radius with default properties.
    #[must_use]
    pub fn sphere(radius: f64) -> Self {
        Self {
            shape: Shape::sphere(radius),
            ..Self::default()
        }
    }

    /// Box with the given half extents and default properties.
    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: Shape::cuboid(half_extents),
            ..Self::default()
        }
    }

    /// Point particle with default properties.
    #[must_use]
    pub fn particle() -> Self {
        Self {
            shape: Shape::Particle,
            ..Self::default()
        }
    }

    /// Sets the position.
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the orientation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Sets the bounce coefficient.
    #[must_use]
    pub fn with_bounce(mut self, bounce: f64) -> Self {
        self.bounce = bounce;
        self
    }

    /// Sets the friction coefficient.
    #[must_use]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    /// Marks the body static.
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the body kinematic.
    #[must_use]
    pub fn kinematic(mut self) -> Self {
        self.is_kinematic = true;
        self
    }
}

/// A simulated body. Owned by [`crate::World`]; read through handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    mass: f64,
    bounce: f64,
    friction: f64,
    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
    pub(crate) acceleration: Vec3,
    pub(crate) shape: Shape,
    pub(crate) is_static: bool,
    pub(crate) is_kinematic: bool,
    pub(crate) is_asleep: bool,
    pub(crate) proxy: Option<ProxyId>,
    trim_position: Vec3,
    trim_velocity: Vec3,
}

impl Body {
    pub(crate) fn from_def(def: &BodyDef) -> Self {
        let rotation = if def.rotation.length_squared() == 0.0 {
            Quat::identity()
        } else {
            def.rotation
        };
        Self {
            mass: def.mass,
            bounce: def.bounce,
            friction: def.friction,
            position: def.position,
            rotation,
            velocity: def.velocity,
            angular_velocity: def.angular_velocity,
            acceleration: Vec3::ZERO,
            shape: def.shape.clone(),
            is_static: def.is_static,
            is_kinematic: def.is_kinematic,
            is_asleep: def.is_asleep,
            proxy: None,
            trim_position: Vec3::ZERO,
            trim_velocity: Vec3::ZERO,
        }
    }

    /// Mass in kilograms.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Restitution coefficient.
    #[must_use]
    pub fn bounce(&self) -> f64 {
        self.bounce
    }

    /// Friction coefficient.
    #[must_use]
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Position and orientation together.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    /// Linear velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Angular velocity.
    #[must_use]
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Acceleration accumulated since the last step.
    #[must_use]
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Collision shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Static flag.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Kinematic flag.
    #[must_use]
    pub fn is_kinematic(&self) -> bool {
        self.is_kinematic
    }

    /// Sleep flag.
    #[must_use]
    pub fn is_asleep(&self) -> bool {
        self.is_asleep
    }

    /// Particles have no extent and are not stored in the spatial index.
    #[must_use]
    pub fn is_particle(&self) -> bool {
        self.shape.is_particle()
    }

    /// Static, kinematic or massless bodies never receive corrections.
    #[must_use]
    pub fn is_immovable(&self) -> bool {
        self.is_static || self.is_kinematic || self.mass <= 0.0
    }

    /// Tight bounding sphere at the current position.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.shape.bounding_radius())
    }

    /// Spatial-index proxy, `None` for particles.
    #[must_use]
    pub fn proxy(&self) -> Option<ProxyId> {
        self.proxy
    }

    /// Pending position correction for this step.
    #[must_use]
    pub fn trim_position(&self) -> Vec3 {
        self.trim_position
    }

    /// Pending velocity correction for this step.
    #[must_use]
    pub fn trim_velocity(&self) -> Vec3 {
        self.trim_velocity
    }

    /// Explicit Euler step. Returns `true` if the position changed.
    ///
    /// Acceleration is cleared whether or not the body moved.
    pub(crate) fn integrate(&mut self, dt: f64, gravity: Vec3) -> bool {
        let mut moved = false;
        if dt > 0.0 {
            self.velocity += (self.acceleration + gravity) * dt;
            if !self.velocity.is_zero() {
                self.position += self.velocity * dt;
                moved = true;
            }
        }
        self.acceleration = Vec3::ZERO;
        moved
    }

    /// Records a correction, keeping only the one with the larger position
    /// magnitude when several contacts touch the body in one step.
    pub(crate) fn set_trim(&mut self, position: Vec3, velocity: Vec3) {
        if position.length_squared() > self.trim_position.length_squared() {
            self.trim_position = position;
            self.trim_velocity = velocity;
        }
    }

    /// Applies and clears the pending trim. Returns `true` if the position
    /// changed.
    pub(crate) fn commit_trim(&mut self) -> bool {
        if !self.trim_velocity.is_zero() {
            self.velocity += self.trim_velocity;
            self.trim_velocity = Vec3::ZERO;
        }
        if self.trim_position.is_zero() {
            return false;
        }
        self.position += self.trim_position;
        self.trim_position = Vec3::ZERO;
        true
    }

    pub(crate) fn clear_motion(&mut self) {
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        self.trim_position = Vec3::ZERO;
        self.trim_velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_rotation_defaults_to_identity() {
        let def = BodyDef::sphere(1.0).with_rotation(Quat::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(Body::from_def(&def).rotation(), Quat::identity());
    }

    #[test]
    fn larger_trim_replaces_smaller_one() {
        let mut body = Body::from_def(&BodyDef::sphere(1.0));
        body.set_trim(Vec3::new(0.1, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        body.set_trim(Vec3::new(0.0, -0.5, 0.0), Vec3::new(0.0, 2.0, 0.0));
        body.set_trim(Vec3::new(0.0, 0.0, 0.2), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(body.trim_position().to_array(), [0.0, -0.5, 0.0]);
        assert_eq!(body.trim_velocity().to_array(), [0.0, 2.0, 0.0]);

        assert!(body.commit_trim());
        assert_eq!(body.position().to_array(), [0.0, -0.5, 0.0]);
        assert_eq!(body.velocity().to_array(), [0.0, 2.0, 0.0]);
        assert!(body.trim_position().is_zero());
        assert!(!body.commit_trim());
    }

    #[test]
    fn integrate_clears_acceleration_even_at_rest() {
        let mut body = Body::from_def(&BodyDef::particle());
        body.acceleration = Vec3::new(0.0, 0.0, 4.0);
        assert!(!body.integrate(0.0, Vec3::ZERO));
        assert!(body.acceleration().is_zero());

        body.acceleration = Vec3::new(2.0, 0.0, 0.0);
        assert!(body.integrate(0.5, Vec3::new(0.0, -2.0, 0.0)));
        assert_eq!(body.velocity().to_array(), [1.0, -1.0, 0.0]);
        assert_eq!(body.position().to_array(), [0.5, -0.5, 0.0]);
    }
}
