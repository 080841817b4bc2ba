use glam::Vec3;
use log::{debug, error, warn};

use crate::{
    collision::{
        broadphase::{CandidatePair, SweepAndPrune},
        narrowphase::{NarrowPhase, Penetration},
        support::ColliderView,
    },
    config::PhysicsConfig,
    core::{
        collider::Collider,
        object::{Component, ComponentKind, Object},
        rigidbody::RigidBody,
        scene::Scene,
        state::SimulationMode,
        transform::{Transform, WorldTransform},
    },
    dynamics::{
        integrator::Integrator,
        resolver::{CollisionEvent, Resolver},
    },
    error::{PhysicsError, Result},
    utils::{allocator::ObjectId, logging::ScopedTimer, profiling::StepProfile},
};

/// Receives every resolved contact after a fixed step.
///
/// `mtv` is the separation applied to `object`; `other` is the object it was
/// pushed out of.
pub trait CollisionListener: Send + Sync {
    fn on_collision(&mut self, object: ObjectId, mtv: Vec3, other: Option<ObjectId>);
}

impl<F> CollisionListener for F
where
    F: FnMut(ObjectId, Vec3, Option<ObjectId>) + Send + Sync,
{
    fn on_collision(&mut self, object: ObjectId, mtv: Vec3, other: Option<ObjectId>) {
        self(object, mtv, other)
    }
}

/// Central simulation container: objects, the collision sweep and the fixed-step loop.
pub struct PhysicsWorld {
    scene: Scene,
    sweep: SweepAndPrune,
    pub integrator: Integrator,
    pub resolver: Resolver,
    config: PhysicsConfig,
    mode: SimulationMode,
    time_accumulated: f32,
    listeners: Vec<Box<dyn CollisionListener>>,
    events: Vec<CollisionEvent>,
    profile: StepProfile,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::from_valid_config(PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PhysicsConfig) -> Self {
        Self {
            scene: Scene::new(),
            sweep: SweepAndPrune::new(&config),
            integrator: Integrator::from_config(&config),
            resolver: Resolver::from_config(&config),
            config,
            mode: SimulationMode::Editing,
            time_accumulated: 0.0,
            listeners: Vec::new(),
            events: Vec::new(),
            profile: StepProfile::default(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.mode == SimulationMode::Running
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn sweep(&self) -> &SweepAndPrune {
        &self.sweep
    }

    pub fn set_parallel_sweep(&mut self, enabled: bool) {
        self.config.parallel_sweep = enabled;
        self.sweep.set_parallel(enabled);
    }

    /// Creates an object with a default transform.
    pub fn create_object(&mut self, name: impl Into<String>) -> ObjectId {
        self.spawn(Object::new(name))
    }

    /// Inserts a prepared object; its collider, if any, joins the sweep.
    pub fn spawn(&mut self, object: Object) -> ObjectId {
        let has_collider = object.has_collider();
        let running = self.is_running();
        let id = self.scene.insert(object);
        if running {
            if let Ok(object) = self.scene.object_mut(id) {
                object.start();
            }
        }
        if has_collider {
            self.sweep.insert(id);
        }
        id
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Result<Object> {
        let object = self.scene.remove(id)?;
        self.sweep.remove(id);
        Ok(object)
    }

    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.scene.object(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.scene.object_mut(id)
    }

    pub fn set_parent(&mut self, child: ObjectId, parent: ObjectId) -> Result<()> {
        self.scene.set_parent(child, parent)
    }

    pub fn clear_parent(&mut self, child: ObjectId) -> Result<()> {
        self.scene.clear_parent(child)
    }

    pub fn add_transform(&mut self, id: ObjectId, transform: Transform) -> Result<()> {
        self.insert_component(id, transform)
    }

    pub fn add_collider(&mut self, id: ObjectId, collider: Collider) -> Result<()> {
        self.insert_component(id, collider)?;
        self.sweep.insert(id);
        debug!("collider added to {id:?}");
        Ok(())
    }

    pub fn remove_collider(&mut self, id: ObjectId) -> Result<Collider> {
        let removed = self.scene.remove_component(id, ComponentKind::Collider)?;
        self.sweep.remove(id);
        match removed {
            Some(Component::Collider(collider)) => {
                debug!("collider removed from {id:?}");
                Ok(collider)
            }
            _ => Err(PhysicsError::MissingCollider(id)),
        }
    }

    pub fn add_rigidbody(&mut self, id: ObjectId, body: RigidBody) -> Result<()> {
        self.insert_component(id, body)?;
        debug!("rigid body added to {id:?}");
        Ok(())
    }

    pub fn remove_rigidbody(&mut self, id: ObjectId) -> Result<RigidBody> {
        match self.scene.remove_component(id, ComponentKind::RigidBody)? {
            Some(Component::RigidBody(body)) => {
                debug!("rigid body removed from {id:?}");
                Ok(body)
            }
            _ => Err(PhysicsError::MissingRigidBody(id)),
        }
    }

    fn insert_component(&mut self, id: ObjectId, component: impl Into<Component>) -> Result<()> {
        let mut component = component.into();
        if self.is_running() {
            match &mut component {
                Component::Transform(transform) => transform.start(),
                Component::RigidBody(body) => body.start(),
                Component::Collider(_) => {}
            }
        }
        self.scene.insert_component(id, component)?;
        Ok(())
    }

    /// Whether the object carries a convex support capability.
    pub fn has_collider(&self, id: ObjectId) -> bool {
        self.scene.has_component(id, ComponentKind::Collider)
    }

    /// Whether the object integrates forces.
    pub fn has_rigidbody(&self, id: ObjectId) -> bool {
        self.scene.has_component(id, ComponentKind::RigidBody)
    }

    pub fn transform(&self, id: ObjectId) -> Result<&Transform> {
        self.scene.transform(id)
    }

    pub fn transform_mut(&mut self, id: ObjectId) -> Result<&mut Transform> {
        self.scene.transform_mut(id)
    }

    pub fn collider(&self, id: ObjectId) -> Result<&Collider> {
        self.scene.collider(id)
    }

    pub fn rigidbody(&self, id: ObjectId) -> Result<&RigidBody> {
        self.scene.rigidbody(id)
    }

    pub fn rigidbody_mut(&mut self, id: ObjectId) -> Result<&mut RigidBody> {
        self.scene.rigidbody_mut(id)
    }

    pub fn world_transform(&self, id: ObjectId) -> Result<WorldTransform> {
        self.scene.world_transform(id)
    }

    pub fn collider_view(&self, id: ObjectId) -> Result<ColliderView<'_>> {
        self.scene.collider_view(id)
    }

    pub fn intersects(&self, a: ObjectId, b: ObjectId) -> Result<bool> {
        Ok(NarrowPhase::intersects(
            &self.collider_view(a)?,
            &self.collider_view(b)?,
        ))
    }

    /// Translation that pushes `a` out of `b`, if they overlap.
    pub fn penetration(&self, a: ObjectId, b: ObjectId) -> Result<Option<Vec3>> {
        Ok(NarrowPhase::penetration(
            &self.collider_view(a)?,
            &self.collider_view(b)?,
        ))
    }

    pub fn contact(&self, a: ObjectId, b: ObjectId) -> Result<Option<Penetration>> {
        Ok(NarrowPhase::contact(
            &self.collider_view(a)?,
            &self.collider_view(b)?,
        ))
    }

    /// Re-sorts the sweep against current transforms and returns the intersecting pairs.
    pub fn candidate_pairs(&mut self) -> Result<Vec<CandidatePair>> {
        self.sweep.update(&self.scene)?;
        self.sweep.candidate_pairs(&self.scene)
    }

    /// Objects currently intersecting `id`.
    pub fn collisions_of(&mut self, id: ObjectId) -> Result<Vec<ObjectId>> {
        self.sweep.update(&self.scene)?;
        self.sweep.collisions_of(&self.scene, id)
    }

    pub fn add_collision_listener<L>(&mut self, listener: L)
    where
        L: CollisionListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Contacts resolved by the most recent fixed step.
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn last_profile(&self) -> &StepProfile {
        &self.profile
    }

    /// Switches every object to its runtime state, seeded from the authored one.
    pub fn start(&mut self) {
        for (_, object) in self.scene.iter_mut() {
            object.start();
        }
        self.mode = SimulationMode::Running;
        self.time_accumulated = 0.0;
        self.events.clear();
        debug!("simulation started with {} objects", self.scene.len());
    }

    /// Returns every object to its authored state.
    pub fn stop(&mut self) {
        for (_, object) in self.scene.iter_mut() {
            object.stop();
        }
        self.mode = SimulationMode::Editing;
        self.time_accumulated = 0.0;
        self.events.clear();
        debug!("simulation stopped");
    }

    /// One fixed step: integrate, sweep, resolve. Listeners run afterwards.
    pub fn advance(&mut self, dt: f32) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }

        self.profile.reset();
        self.events.clear();

        {
            let _timer = ScopedTimer::recording("integrate", &mut self.profile.integrate_time);
            self.profile.body_count = self.integrator.step(&mut self.scene, dt)?;
        }

        let pairs = {
            let _timer = ScopedTimer::recording("sweep", &mut self.profile.sweep_time);
            self.sweep.update(&self.scene)?;
            self.sweep.candidate_pairs(&self.scene)?
        };
        self.profile.edge_count = self.sweep.len();
        self.profile.candidate_pairs = pairs.len();

        let events = {
            let _timer = ScopedTimer::recording("resolve", &mut self.profile.resolve_time);
            self.resolver.resolve(&mut self.scene, &pairs)?
        };
        self.profile.resolved_contacts = events.len();

        for event in &events {
            for listener in &mut self.listeners {
                listener.on_collision(event.object, event.mtv, event.other);
            }
        }
        self.events = events;
        self.profile.report();
        Ok(())
    }

    /// Frame entry point: runs as many fixed steps as the elapsed time allows,
    /// up to the catch-up cap. Does nothing unless the simulation is running.
    ///
    /// A failing step is logged and the loop carries on with the next one.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        if !self.is_running() {
            return 0;
        }

        let fixed = self.config.fixed_time_step;
        self.time_accumulated += frame_dt.max(0.0);

        let mut steps = 0;
        while self.time_accumulated >= fixed && steps < self.config.max_catch_up_steps {
            if let Err(err) = self.advance(fixed) {
                error!("fixed step failed: {err}");
            }
            self.time_accumulated -= fixed;
            steps += 1;
        }

        if self.time_accumulated >= fixed {
            warn!(
                "dropping {:.3} s of simulation time after {steps} catch-up steps",
                self.time_accumulated
            );
            self.time_accumulated %= fixed;
        }
        steps
    }
}
