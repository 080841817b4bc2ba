use serde::{Deserialize, Serialize};

use super::{collider::Collider, rigidbody::RigidBody, transform::Transform};
use crate::{
    error::{PhysicsError, Result},
    utils::allocator::ObjectId,
};

/// Closed set of component kinds an object can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Transform,
    Collider,
    RigidBody,
}

impl ComponentKind {
    const COUNT: usize = 3;

    fn slot(self) -> usize {
        match self {
            ComponentKind::Transform => 0,
            ComponentKind::Collider => 1,
            ComponentKind::RigidBody => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Component {
    Transform(Transform),
    Collider(Collider),
    RigidBody(RigidBody),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::Collider(_) => ComponentKind::Collider,
            Component::RigidBody(_) => ComponentKind::RigidBody,
        }
    }
}

impl From<Transform> for Component {
    fn from(value: Transform) -> Self {
        Component::Transform(value)
    }
}

impl From<Collider> for Component {
    fn from(value: Collider) -> Self {
        Component::Collider(value)
    }
}

impl From<RigidBody> for Component {
    fn from(value: RigidBody) -> Self {
        Component::RigidBody(value)
    }
}

/// At most one component per kind, addressed by [`ComponentKind`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentTable {
    slots: [Option<Component>; ComponentKind::COUNT],
}

impl ComponentTable {
    /// Stores `component`, returning the one it replaced.
    pub fn insert(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        self.slots[component.kind().slot()].replace(component)
    }

    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.slots[kind.slot()].take()
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.slots[kind.slot()].as_ref()
    }

    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.slots.iter().flatten().map(Component::kind)
    }

    pub fn transform(&self) -> Option<&Transform> {
        match self.get(ComponentKind::Transform) {
            Some(Component::Transform(transform)) => Some(transform),
            _ => None,
        }
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        match self.slots[ComponentKind::Transform.slot()].as_mut() {
            Some(Component::Transform(transform)) => Some(transform),
            _ => None,
        }
    }

    pub fn collider(&self) -> Option<&Collider> {
        match self.get(ComponentKind::Collider) {
            Some(Component::Collider(collider)) => Some(collider),
            _ => None,
        }
    }

    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        match self.slots[ComponentKind::Collider.slot()].as_mut() {
            Some(Component::Collider(collider)) => Some(collider),
            _ => None,
        }
    }

    pub fn rigidbody(&self) -> Option<&RigidBody> {
        match self.get(ComponentKind::RigidBody) {
            Some(Component::RigidBody(body)) => Some(body),
            _ => None,
        }
    }

    pub fn rigidbody_mut(&mut self) -> Option<&mut RigidBody> {
        match self.slots[ComponentKind::RigidBody.slot()].as_mut() {
            Some(Component::RigidBody(body)) => Some(body),
            _ => None,
        }
    }

    /// Transform and rigid body borrowed together, for integration and impulses.
    pub fn body_parts_mut(&mut self) -> (Option<&mut Transform>, Option<&mut RigidBody>) {
        let [transform, _, body] = &mut self.slots;
        let transform = match transform {
            Some(Component::Transform(transform)) => Some(transform),
            _ => None,
        };
        let body = match body {
            Some(Component::RigidBody(body)) => Some(body),
            _ => None,
        };
        (transform, body)
    }
}

/// A scene object: a name, a place in the hierarchy and its components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
    pub(crate) components: ComponentTable,
}

impl Object {
    /// New object carrying a default transform.
    pub fn new(name: impl Into<String>) -> Self {
        let mut components = ComponentTable::default();
        components.insert(Transform::default());
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            components,
        }
    }

    /// New object with no components at all.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            components: ComponentTable::default(),
        }
    }

    /// Adds `component` before the object is spawned, replacing one of the same kind.
    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        self.components.insert(component);
        self
    }

    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Whether this object carries a convex support capability.
    pub fn has_collider(&self) -> bool {
        self.components.contains(ComponentKind::Collider)
    }

    /// Whether this object integrates forces.
    pub fn has_rigidbody(&self) -> bool {
        self.components.contains(ComponentKind::RigidBody)
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.components.transform()
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.components.collider()
    }

    pub fn rigidbody(&self) -> Option<&RigidBody> {
        self.components.rigidbody()
    }

    pub fn require_transform(&self, id: ObjectId) -> Result<&Transform> {
        self.transform().ok_or(PhysicsError::MissingTransform(id))
    }

    pub fn require_collider(&self, id: ObjectId) -> Result<&Collider> {
        self.collider().ok_or(PhysicsError::MissingCollider(id))
    }

    pub fn require_rigidbody(&self, id: ObjectId) -> Result<&RigidBody> {
        self.rigidbody().ok_or(PhysicsError::MissingRigidBody(id))
    }

    pub(crate) fn start(&mut self) {
        if let Some(transform) = self.components.transform_mut() {
            transform.start();
        }
        if let Some(body) = self.components.rigidbody_mut() {
            body.start();
        }
    }

    pub(crate) fn stop(&mut self) {
        if let Some(transform) = self.components.transform_mut() {
            transform.stop();
        }
        if let Some(body) = self.components.rigidbody_mut() {
            body.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collider::ColliderShape;

    #[test]
    fn table_holds_one_component_per_kind() {
        let mut table = ComponentTable::default();
        assert!(table.insert(Collider::new(ColliderShape::sphere(1.0))).is_none());
        let replaced = table.insert(Collider::new(ColliderShape::unit_box()));
        assert!(matches!(replaced, Some(Component::Collider(_))));
        assert_eq!(
            table.collider().map(Collider::shape),
            Some(&ColliderShape::unit_box())
        );
        assert_eq!(table.kinds().count(), 1);
    }

    #[test]
    fn capability_queries_follow_components() {
        let mut object = Object::new("crate");
        assert!(!object.has_collider());
        assert!(!object.has_rigidbody());

        object.components.insert(RigidBody::new());
        assert!(object.has_rigidbody());

        object.components.remove(ComponentKind::RigidBody);
        assert!(!object.has_rigidbody());
    }

    #[test]
    fn missing_transform_is_reported() {
        let object = Object::empty("ghost");
        let id = ObjectId::new(4, 0);
        assert_eq!(
            object.require_transform(id).err(),
            Some(PhysicsError::MissingTransform(id))
        );
    }
}
