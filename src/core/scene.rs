use log::debug;

use super::{
    collider::Collider,
    object::{Component, ComponentKind, Object},
    rigidbody::RigidBody,
    transform::{Transform, WorldTransform},
};
use crate::{
    collision::support::ColliderView,
    error::{PhysicsError, Result},
    utils::allocator::{Arena, ObjectId},
};

/// Object storage plus the hierarchy and sibling-component lookups built on it.
#[derive(Default)]
pub struct Scene {
    objects: Arena<Object>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: Object) -> ObjectId {
        let id = self.objects.insert(object);
        debug!("object {id:?} added");
        id
    }

    /// Removes an object, detaching it from its parent and orphaning its children.
    pub fn remove(&mut self, id: ObjectId) -> Result<Object> {
        let object = self.objects.remove(id).ok_or(PhysicsError::UnknownObject(id))?;
        if let Some(parent) = object.parent.and_then(|parent| self.objects.get_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
        for &child in &object.children {
            if let Some(orphan) = self.objects.get_mut(child) {
                orphan.parent = None;
            }
            self.invalidate_bounds(child);
        }
        debug!("object {id:?} removed");
        Ok(object)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> + '_ {
        self.objects.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut Object)> + '_ {
        self.objects.iter_mut()
    }

    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.objects.get(id).ok_or(PhysicsError::UnknownObject(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects.get_mut(id).ok_or(PhysicsError::UnknownObject(id))
    }

    pub(crate) fn pair_mut(&mut self, a: ObjectId, b: ObjectId) -> Option<(&mut Object, &mut Object)> {
        self.objects.get2_mut(a, b)
    }

    pub fn transform(&self, id: ObjectId) -> Result<&Transform> {
        self.object(id)?.require_transform(id)
    }

    pub fn transform_mut(&mut self, id: ObjectId) -> Result<&mut Transform> {
        self.object_mut(id)?
            .components
            .transform_mut()
            .ok_or(PhysicsError::MissingTransform(id))
    }

    pub fn collider(&self, id: ObjectId) -> Result<&Collider> {
        self.object(id)?.require_collider(id)
    }

    pub fn rigidbody(&self, id: ObjectId) -> Result<&RigidBody> {
        self.object(id)?.require_rigidbody(id)
    }

    pub fn rigidbody_mut(&mut self, id: ObjectId) -> Result<&mut RigidBody> {
        self.object_mut(id)?
            .components
            .rigidbody_mut()
            .ok_or(PhysicsError::MissingRigidBody(id))
    }

    /// Stores `component` on `id`. A new transform moves the whole subtree, so
    /// cached bounds below `id` are dropped.
    pub fn insert_component(
        &mut self,
        id: ObjectId,
        component: impl Into<Component>,
    ) -> Result<Option<Component>> {
        let component = component.into();
        let kind = component.kind();
        let replaced = self.object_mut(id)?.components.insert(component);
        if kind != ComponentKind::RigidBody {
            self.invalidate_bounds(id);
        }
        Ok(replaced)
    }

    pub fn remove_component(
        &mut self,
        id: ObjectId,
        kind: ComponentKind,
    ) -> Result<Option<Component>> {
        let removed = self.object_mut(id)?.components.remove(kind);
        if kind == ComponentKind::Transform {
            self.invalidate_bounds(id);
        }
        Ok(removed)
    }

    /// Drops the cached bounds of `id` and of every object below it.
    pub fn invalidate_bounds(&mut self, id: ObjectId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(object) = self.objects.get_mut(current) else {
                continue;
            };
            if let Some(collider) = object.components.collider_mut() {
                collider.invalidate_bounds();
            }
            pending.extend_from_slice(&object.children);
        }
    }

    pub fn has_component(&self, id: ObjectId, kind: ComponentKind) -> bool {
        self.objects
            .get(id)
            .is_some_and(|object| object.components.contains(kind))
    }

    /// Places `child` under `parent`, rejecting self-parenting and cycles.
    pub fn set_parent(&mut self, child: ObjectId, parent: ObjectId) -> Result<()> {
        self.object(child)?;
        self.object(parent)?;

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(PhysicsError::ParentCycle { child, parent });
            }
            cursor = self.object(current)?.parent;
        }

        self.clear_parent(child)?;
        self.object_mut(child)?.parent = Some(parent);
        self.object_mut(parent)?.children.push(child);
        self.invalidate_bounds(child);
        Ok(())
    }

    pub fn clear_parent(&mut self, child: ObjectId) -> Result<()> {
        let previous = self.object_mut(child)?.parent.take();
        if let Some(previous) = previous {
            if let Some(parent) = self.objects.get_mut(previous) {
                parent.children.retain(|id| *id != child);
            }
            self.invalidate_bounds(child);
        }
        Ok(())
    }

    /// True when one object is the direct parent of the other.
    pub fn are_related(&self, a: ObjectId, b: ObjectId) -> bool {
        let parent_of = |id: ObjectId| self.objects.get(id).and_then(Object::parent);
        parent_of(a) == Some(b) || parent_of(b) == Some(a)
    }

    /// Local transform composed through every ancestor.
    pub fn world_transform(&self, id: ObjectId) -> Result<WorldTransform> {
        let object = self.object(id)?;
        let local = object.require_transform(id)?;
        match object.parent {
            Some(parent) => Ok(self.world_transform(parent)?.compose(local)),
            None => Ok(WorldTransform::from_local(local)),
        }
    }

    /// The object's collider bound to its world transform.
    pub fn collider_view(&self, id: ObjectId) -> Result<ColliderView<'_>> {
        let collider = self.collider(id)?;
        Ok(ColliderView::new(collider, self.world_transform(id)?))
    }
}
