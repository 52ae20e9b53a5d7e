//! Dependency chain traversal
//!
//! Messages are often sent to one object but meant for another one bound
//! to it: a signature check sent to a certificate is carried out by the
//! context behind it, a configuration option set on the system device
//! belongs to the default user. These helpers walk from the object a
//! message was sent to until they reach an object of an acceptable type.

use super::handle::ObjectHandle;
use super::table::ObjectTable;
use crate::acl::Route;
use crate::object_type::ObjectType;

/// Longest chain followed: object, dependent object, dependent device
const MAX_HOPS: usize = 3;

/// Resolve `route` starting at `handle`.
///
/// A route of [`Route::None`] resolves to the object itself. Returns
/// `None` if no object of an accepted type is reachable.
pub fn find_target(objects: &ObjectTable, handle: ObjectHandle, route: Route) -> Option<ObjectHandle> {
    if route.is_none() {
        return objects.is_valid(handle).then_some(handle);
    }

    let mut current = handle;
    for _ in 0..MAX_HOPS {
        let record = objects.get(current)?;
        if route.accepts(record.object_type) {
            return Some(current);
        }
        current = if route.accepts(ObjectType::User) {
            // Users are reached through ownership, the system device
            // speaks for the default user
            if current == ObjectHandle::SYSTEM_DEVICE {
                ObjectHandle::DEFAULT_USER
            } else {
                record.owner?
            }
        } else {
            record.dependent_object.or(record.dependent_device)?
        };
    }
    None
}

/// Resolve a single object type starting at `handle`
pub fn find_target_type(
    objects: &ObjectTable,
    handle: ObjectHandle,
    object_type: ObjectType,
) -> Option<ObjectHandle> {
    find_target(objects, handle, Route::Object(object_type))
}
