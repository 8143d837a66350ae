// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The simulation world: body lifecycle, queries and the fixed-step loop.

use std::fmt;

use orb_geom::{BroadPhase, Bounds, ProxyId, Quat, RayCastInput, Shape, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::body::{Body, BodyDef};
use crate::body_set::{BodyHandle, BodySet, Category};
use crate::collide::NarrowPhase;
use crate::config::WorldConfig;
use crate::error::WorldError;

type PairListener = Box<dyn FnMut(BodyHandle, BodyHandle)>;

/// Summary of one [`World::update`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepReport {
    /// Index of the step just completed, starting at 1.
    pub step: u64,
    /// Bodies that went through integration (active and particle lists).
    pub integrated: usize,
    /// Distinct candidate pairs produced by the broad phase.
    pub candidate_pairs: usize,
    /// Pairs (including particle queries) that overlapped and were resolved.
    pub contacts: usize,
}

/// Closest hit reported by [`World::ray_cast_closest_bounds`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    /// Body whose bound was hit.
    pub body: BodyHandle,
    /// Tight bound of that body.
    pub bounds: Bounds,
    /// Distance along the ray to the entry point.
    pub distance: f64,
}

/// Owns every body plus the broad and narrow phases.
///
/// Each step integrates moving bodies, resolves broad-phase pairs and
/// particle queries into pending trims, then commits the trims. Worlds are
/// independent values; two worlds fed the same calls produce identical
/// results.
pub struct World {
    config: WorldConfig,
    bodies: BodySet,
    broad: BroadPhase<BodyHandle>,
    narrow: NarrowPhase,
    step: u64,
    listener: Option<PairListener>,
    pair_scratch: Vec<(BodyHandle, BodyHandle)>,
    hit_scratch: Vec<BodyHandle>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("proxies", &self.broad.proxy_count())
            .field("step", &self.step)
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }
}

impl World {
    /// Empty world with [`WorldConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty world with a validated configuration.
    ///
    /// # Errors
    /// [`WorldError::Config`] if `config` fails validation.
    pub fn with_config(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            broad: BroadPhase::with_margin(config.fat_margin),
            narrow: NarrowPhase::new(config.bounce_combine),
            config,
            bodies: BodySet::default(),
            step: 0,
            listener: None,
            pair_scratch: Vec::new(),
            hit_scratch: Vec::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of completed steps.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Number of live bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// `true` when no bodies are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.len() == 0
    }

    /// Read access to the broad phase (and through it, the tree).
    #[must_use]
    pub fn broad_phase(&self) -> &BroadPhase<BodyHandle> {
        &self.broad
    }

    /// Body behind `handle`, or `None` for stale handles.
    #[must_use]
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Whether `handle` refers to a live body.
    #[must_use]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.get(handle).is_some()
    }

    /// Per-step list the body currently belongs to.
    #[must_use]
    pub fn category(&self, handle: BodyHandle) -> Option<Category> {
        self.bodies.category(handle)
    }

    /// Visits every live body in slot order.
    pub fn for_each_body<F>(&self, mut visit: F)
    where
        F: FnMut(BodyHandle, &Body),
    {
        for (handle, body) in self.bodies.iter() {
            visit(handle, body);
        }
    }

    /// Installs the callback invoked once per colliding pair per step.
    ///
    /// The callback only receives handles; it cannot reach the world, so it
    /// cannot create or destroy bodies mid-step.
    pub fn set_pair_listener<F>(&mut self, listener: F)
    where
        F: FnMut(BodyHandle, BodyHandle) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Removes the pair callback.
    pub fn clear_pair_listener(&mut self) {
        self.listener = None;
    }

    /// Creates a body. Non-particle bodies get a proxy in the tree.
    ///
    /// # Errors
    /// [`WorldError::Tree`] if the tree reports corruption; the body is not
    /// created in that case.
    pub fn create_body(&mut self, def: &BodyDef) -> Result<BodyHandle, WorldError> {
        let body = Body::from_def(def);
        let bounds = body.bounds();
        let indexed = !body.is_particle();
        let handle = self.bodies.insert(body);
        if indexed {
            match self.broad.create_proxy(bounds, handle) {
                Ok(proxy) => {
                    if let Some(body) = self.bodies.get_mut(handle) {
                        body.proxy = Some(proxy);
                    }
                }
                Err(err) => {
                    self.bodies.remove(handle);
                    return Err(err.into());
                }
            }
        }
        trace!(?handle, category = ?self.bodies.category(handle), "created body");
        Ok(handle)
    }

    /// Destroys a body and its proxy. Returns `false` for stale handles.
    ///
    /// # Errors
    /// [`WorldError::Tree`] if the tree reports corruption while removing
    /// the proxy.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<bool, WorldError> {
        let Some(body) = self.bodies.remove(handle) else {
            return Ok(false);
        };
        if let Some(proxy) = body.proxy {
            self.broad.destroy_proxy(proxy)?;
        }
        trace!(?handle, "destroyed body");
        Ok(true)
    }

    /// Destroys every body.
    ///
    /// # Errors
    /// As [`World::destroy_body`].
    pub fn clear(&mut self) -> Result<(), WorldError> {
        for handle in self.bodies.handles() {
            self.destroy_body(handle)?;
        }
        Ok(())
    }

    /// Teleports a body and refreshes its proxy.
    ///
    /// # Errors
    /// [`WorldError::Tree`] if reinsertion finds corruption.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec3) -> Result<bool, WorldError> {
        let Some(body) = self.bodies.get_mut(handle) else {
            return Ok(false);
        };
        body.position = position;
        if let Some(proxy) = body.proxy {
            sync_proxy(&mut self.broad, proxy, body.bounds())?;
        }
        Ok(true)
    }

    /// Sets the orientation. Bounding spheres ignore rotation, so the proxy
    /// is only touched so that box contacts are re-tested.
    pub fn set_rotation(&mut self, handle: BodyHandle, rotation: Quat) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.rotation = if rotation.length_squared() == 0.0 {
            Quat::identity()
        } else {
            rotation
        };
        if let Some(proxy) = body.proxy {
            self.broad.touch_proxy(proxy);
        }
        true
    }

    /// Sets the linear velocity.
    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.velocity = velocity;
        true
    }

    /// Adds to the acceleration consumed by the next integration.
    pub fn apply_acceleration(&mut self, handle: BodyHandle, acceleration: Vec3) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.acceleration += acceleration;
        true
    }

    /// Replaces the shape. Switching to or from [`Shape::Particle`] removes
    /// or creates the proxy and moves the body between lists.
    ///
    /// # Errors
    /// [`WorldError::Tree`] if the tree reports corruption.
    pub fn set_shape(&mut self, handle: BodyHandle, shape: Shape) -> Result<bool, WorldError> {
        let Some(body) = self.bodies.get_mut(handle) else {
            return Ok(false);
        };
        body.shape = shape;
        let bounds = body.bounds();
        match (body.is_particle(), body.proxy) {
            (true, Some(proxy)) => {
                body.proxy = None;
                self.broad.destroy_proxy(proxy)?;
            }
            (false, Some(proxy)) => sync_proxy(&mut self.broad, proxy, bounds)?,
            (false, None) => {
                let proxy = self.broad.create_proxy(bounds, handle)?;
                body.proxy = Some(proxy);
            }
            (true, None) => {}
        }
        self.bodies.recategorize(handle);
        Ok(true)
    }

    /// Puts a body to sleep or wakes it. Sleeping bodies skip integration
    /// but still collide with moving neighbours.
    pub fn set_asleep(&mut self, handle: BodyHandle, asleep: bool) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.is_asleep = asleep;
        let proxy = body.proxy;
        self.bodies.recategorize(handle);
        if let (false, Some(proxy)) = (asleep, proxy) {
            self.broad.touch_proxy(proxy);
        }
        true
    }

    /// Marks a body kinematic (integrates, never corrected) or dynamic.
    pub fn set_kinematic(&mut self, handle: BodyHandle, kinematic: bool) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.is_kinematic = kinematic;
        if let Some(proxy) = body.proxy {
            self.broad.touch_proxy(proxy);
        }
        true
    }

    /// Moves a body between the inactive list and its moving list.
    ///
    /// Making a body static stops it and discards pending trims. Static
    /// bodies keep their proxy so moving bodies still collide with them.
    pub fn make_static(&mut self, handle: BodyHandle, is_static: bool) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        if body.is_static == is_static {
            return true;
        }
        body.is_static = is_static;
        if is_static {
            body.clear_motion();
        }
        let proxy = body.proxy;
        self.bodies.recategorize(handle);
        if let Some(proxy) = proxy {
            self.broad.touch_proxy(proxy);
        }
        true
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// `dt == 0` still resolves overlaps without moving anything.
    ///
    /// # Errors
    /// [`WorldError::InvalidTimeStep`] for negative or non-finite `dt`;
    /// [`WorldError::Tree`] if the tree reports corruption mid-step.
    #[instrument(level = "debug", skip(self), fields(step = self.step + 1))]
    pub fn update(&mut self, dt: f64) -> Result<StepReport, WorldError> {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "rejected time step");
            return Err(WorldError::InvalidTimeStep { dt });
        }
        let integrated = self.integrate(dt)?;
        let (candidate_pairs, pair_contacts) = self.resolve_pairs();
        let particle_contacts = self.resolve_particles();
        self.commit()?;
        self.step += 1;

        let report = StepReport {
            step: self.step,
            integrated,
            candidate_pairs,
            contacts: pair_contacts + particle_contacts,
        };
        debug!(
            integrated,
            candidate_pairs,
            contacts = report.contacts,
            "step complete"
        );
        Ok(report)
    }

    fn integrate(&mut self, dt: f64) -> Result<usize, WorldError> {
        let gravity = self.config.gravity;
        let mut integrated = 0;
        for category in [Category::Active, Category::Particle] {
            for pos in 0..self.bodies.list(category).len() {
                let index = self.bodies.list(category)[pos];
                let Some(handle) = self.bodies.handle_at(index) else {
                    continue;
                };
                let Some(body) = self.bodies.get_mut(handle) else {
                    continue;
                };
                integrated += 1;
                if body.integrate(dt, gravity) {
                    if let Some(proxy) = body.proxy {
                        sync_proxy(&mut self.broad, proxy, body.bounds())?;
                    }
                }
            }
        }
        Ok(integrated)
    }

    fn resolve_pairs(&mut self) -> (usize, usize) {
        let mut pairs = std::mem::take(&mut self.pair_scratch);
        pairs.clear();
        let candidates = self.broad.update_pairs(|a, b| pairs.push((a, b)));
        let mut contacts = 0;
        for &(a, b) in &pairs {
            let Some((body_a, body_b)) = self.bodies.get2_mut(a, b) else {
                continue;
            };
            if self.narrow.collide(body_a, body_b) {
                contacts += 1;
                trace!(?a, ?b, "pair contact");
                if let Some(listener) = self.listener.as_mut() {
                    listener(a, b);
                }
            }
        }
        self.pair_scratch = pairs;
        (candidates, contacts)
    }

    fn resolve_particles(&mut self) -> usize {
        let mut hits = std::mem::take(&mut self.hit_scratch);
        let mut contacts = 0;
        for category in [Category::Particle, Category::Inactive] {
            for pos in 0..self.bodies.list(category).len() {
                let index = self.bodies.list(category)[pos];
                let Some(particle) = self.bodies.handle_at(index) else {
                    continue;
                };
                let Some(bounds) = self
                    .bodies
                    .get(particle)
                    .filter(|body| body.is_particle())
                    .map(Body::bounds)
                else {
                    continue;
                };
                hits.clear();
                let bodies = &self.bodies;
                let broad = &self.broad;
                broad.query(&bounds, |id| {
                    let Some(other) = broad.payload(id) else {
                        return true;
                    };
                    // Resting particles only meet bodies that are moving.
                    if category == Category::Particle
                        || bodies.category(other) != Some(Category::Inactive)
                    {
                        hits.push(other);
                    }
                    true
                });
                contacts += self.collide_particle(particle, &hits);
            }
        }
        self.hit_scratch = hits;
        contacts
    }

    fn collide_particle(&mut self, particle: BodyHandle, hits: &[BodyHandle]) -> usize {
        let mut contacts = 0;
        for &other in hits {
            let Some((body_p, body_o)) = self.bodies.get2_mut(particle, other) else {
                continue;
            };
            if self.narrow.collide(body_p, body_o) {
                contacts += 1;
                trace!(?particle, ?other, "particle contact");
                if let Some(listener) = self.listener.as_mut() {
                    listener(particle, other);
                }
            }
        }
        contacts
    }

    fn commit(&mut self) -> Result<(), WorldError> {
        for category in [Category::Active, Category::Particle, Category::Inactive] {
            for pos in 0..self.bodies.list(category).len() {
                let index = self.bodies.list(category)[pos];
                let Some(handle) = self.bodies.handle_at(index) else {
                    continue;
                };
                let Some(body) = self.bodies.get_mut(handle) else {
                    continue;
                };
                if body.commit_trim() {
                    if let Some(proxy) = body.proxy {
                        sync_proxy(&mut self.broad, proxy, body.bounds())?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Visits every indexed body whose tight bound intersects `region`.
    ///
    /// Particles are not indexed and never reported. The visitor returns
    /// `false` to stop early.
    pub fn query_bounds<F>(&self, region: &Bounds, mut visit: F)
    where
        F: FnMut(BodyHandle, &Bounds) -> bool,
    {
        let bodies = &self.bodies;
        let broad = &self.broad;
        broad.query(region, |id| {
            let Some((handle, bounds)) = tight_bounds(bodies, broad, id) else {
                return true;
            };
            if !bounds.intersects(region) {
                return true;
            }
            visit(handle, &bounds)
        });
    }

    /// Casts a ray against the tight bounds of indexed bodies.
    ///
    /// `visit(body, bounds, distance)` returns `true` to keep going or
    /// `false` to stop. Hits are reported in tree order, not by distance.
    pub fn ray_cast_bounds<F>(&self, input: &RayCastInput, mut visit: F)
    where
        F: FnMut(BodyHandle, &Bounds, f64) -> bool,
    {
        let bodies = &self.bodies;
        let broad = &self.broad;
        let max_distance = input.max_distance;
        broad.ray_cast(input, |id, _| {
            let Some((handle, bounds)) = tight_bounds(bodies, broad, id) else {
                return max_distance;
            };
            match bounds.intersect_ray(&input.ray) {
                Some(distance) if distance <= max_distance => {
                    if visit(handle, &bounds, distance) {
                        max_distance
                    } else {
                        -1.0
                    }
                }
                _ => max_distance,
            }
        });
    }

    /// Closest tight-bound hit along the ray, if any.
    #[must_use]
    pub fn ray_cast_closest_bounds(&self, input: &RayCastInput) -> Option<RayHit> {
        let bodies = &self.bodies;
        let broad = &self.broad;
        let mut best: Option<RayHit> = None;
        let mut limit = input.max_distance;
        broad.ray_cast(input, |id, _| {
            let Some((handle, bounds)) = tight_bounds(bodies, broad, id) else {
                return limit;
            };
            if let Some(distance) = bounds.intersect_ray(&input.ray) {
                if distance <= limit {
                    limit = distance;
                    best = Some(RayHit {
                        body: handle,
                        bounds,
                        distance,
                    });
                }
            }
            limit
        });
        best
    }
}

/// Reinserts a proxy whose bound escaped its fat bound, or touches it so the
/// next pair update still sees the motion.
fn sync_proxy(
    broad: &mut BroadPhase<BodyHandle>,
    proxy: ProxyId,
    bounds: Bounds,
) -> Result<(), WorldError> {
    if broad.move_proxy(proxy, bounds)? {
        trace!(?proxy, "reinserted proxy");
    } else {
        broad.touch_proxy(proxy);
    }
    Ok(())
}

fn tight_bounds(
    bodies: &BodySet,
    broad: &BroadPhase<BodyHandle>,
    id: ProxyId,
) -> Option<(BodyHandle, Bounds)> {
    let handle = broad.payload(id)?;
    bodies.get(handle).map(|body| (handle, body.bounds()))
}
