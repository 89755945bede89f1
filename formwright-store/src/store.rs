//! Copy-on-write value tree with element identity tables.

use crate::error::{StoreError, StoreResult};
use formwright_types::{ElementId, FieldPath, Segment};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A path segment where array positions are replaced by element identity,
/// so keys in the identity table do not move when siblings are removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StableSegment {
    Key(String),
    Element(ElementId),
}

type StableKey = Vec<StableSegment>;

/// A path with its array positions pinned to element identity.
///
/// Resolves back to an indexed path for as long as every element on it
/// still exists, wherever those elements have moved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StablePath(StableKey);

/// Path-addressed store for one editing session's configuration value.
#[derive(Debug, Clone)]
pub struct ValueStore {
    root: Arc<Value>,
    /// Element ids for every array in the tree, keyed by the array's stable path.
    identities: HashMap<StableKey, Vec<ElementId>>,
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl ValueStore {
    /// Creates a store holding `value`, assigning fresh ids to every array element.
    pub fn new(value: Value) -> Self {
        let mut store = Self {
            root: Arc::new(value),
            identities: HashMap::new(),
        };
        index_subtree(&mut store.identities, Vec::new(), &store.root);
        store
    }

    /// The current value.
    pub fn value(&self) -> &Value {
        &self.root
    }

    /// A structure-sharing snapshot of the current value.
    ///
    /// The snapshot never observes later writes: the store clones the tree
    /// on its next write instead of mutating the shared one.
    pub fn snapshot(&self) -> Arc<Value> {
        Arc::clone(&self.root)
    }

    /// Replaces the whole value, discarding all element identities.
    pub fn replace(&mut self, value: Value) {
        *self = Self::new(value);
    }

    /// Reads the value at `path`.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// Writes `value` at `path`, creating missing intermediate mappings.
    ///
    /// `null` intermediates are replaced by a mapping (or, before an index
    /// segment, an array). An index equal to the array length appends.
    /// Arrays inside `value` receive fresh element ids; the element being
    /// written keeps its own id when `path` ends at an index.
    pub fn set(&mut self, path: &FieldPath, value: Value) -> StoreResult<()> {
        if path.is_root() {
            self.replace(value);
            return Ok(());
        }

        check_writable(&self.root, path)?;
        {
            let root = Arc::make_mut(&mut self.root);
            *slot_mut(root, path)? = value;
        }

        if let Some(key) = self.reconcile(path) {
            drop_subtree(&mut self.identities, &key);
            if let Some(written) = lookup(&self.root, path) {
                index_subtree(&mut self.identities, key, written);
            }
        }
        Ok(())
    }

    /// Removes the value at `path`, returning it.
    ///
    /// Removing an array element drops that element's id; the remaining
    /// elements keep theirs and simply move down one position.
    pub fn delete(&mut self, path: &FieldPath) -> StoreResult<Option<Value>> {
        let Some(parent_path) = path.parent() else {
            let old = (*self.root).clone();
            self.replace(Value::Object(Map::new()));
            return Ok(Some(old));
        };
        if self.get(path).is_none() {
            return Ok(None);
        }

        let parent_key = if matches!(path.last(), Some(Segment::Index(_))) {
            self.sync_array(&parent_path)
        } else {
            self.reconcile(&parent_path)
        };
        let root = Arc::make_mut(&mut self.root);
        let Some(parent) = lookup_mut(root, &parent_path) else {
            return Ok(None);
        };

        match (parent, path.last()) {
            (Value::Object(map), Some(Segment::Key(key))) => {
                let removed = map.remove(key);
                if let Some(mut stable) = parent_key {
                    stable.push(StableSegment::Key(key.clone()));
                    drop_subtree(&mut self.identities, &stable);
                }
                Ok(removed)
            }
            (Value::Array(items), Some(Segment::Index(index))) if *index < items.len() => {
                let removed = items.remove(*index);
                if let Some(stable) = parent_key {
                    let removed_id = self
                        .identities
                        .get_mut(&stable)
                        .and_then(|ids| (*index < ids.len()).then(|| ids.remove(*index)));
                    if let Some(id) = removed_id {
                        let mut element = stable;
                        element.push(StableSegment::Element(id));
                        drop_subtree(&mut self.identities, &element);
                        debug!(path = %path, element = %id, "array element removed");
                    }
                }
                Ok(Some(removed))
            }
            _ => Ok(None),
        }
    }

    /// Appends `value` to the array at `array_path` (creating the array if
    /// absent) and returns the new element's id.
    pub fn push(&mut self, array_path: &FieldPath, value: Value) -> StoreResult<ElementId> {
        let len = match self.get(array_path) {
            None | Some(Value::Null) => 0,
            Some(Value::Array(items)) => items.len(),
            Some(_) => {
                return Err(StoreError::NotAnArray {
                    path: array_path.clone(),
                })
            }
        };
        self.set(&array_path.index(len), value)?;
        self.element_id(array_path, len)
            .ok_or_else(|| StoreError::IndexOutOfBounds {
                path: array_path.clone(),
                index: len,
                len,
            })
    }

    /// Moves the element at `from` to position `to`, carrying its id along.
    pub fn move_element(&mut self, array_path: &FieldPath, from: usize, to: usize) -> StoreResult<()> {
        let key = self.sync_array(array_path);
        let root = Arc::make_mut(&mut self.root);
        let Some(Value::Array(items)) = lookup_mut(root, array_path) else {
            return Err(StoreError::NotAnArray {
                path: array_path.clone(),
            });
        };
        let len = items.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::IndexOutOfBounds {
                    path: array_path.clone(),
                    index,
                    len,
                });
            }
        }
        let item = items.remove(from);
        items.insert(to, item);

        if let Some(ids) = key.and_then(|k| self.identities.get_mut(&k)) {
            let id = ids.remove(from);
            ids.insert(to, id);
        }
        Ok(())
    }

    /// The id of the element at `index` of the array at `array_path`.
    pub fn element_id(&self, array_path: &FieldPath, index: usize) -> Option<ElementId> {
        let key = self.stable_key(array_path)?;
        self.identities.get(&key)?.get(index).copied()
    }

    /// The ids of all elements of the array at `array_path`, in order.
    pub fn element_ids(&self, array_path: &FieldPath) -> Vec<ElementId> {
        self.stable_key(array_path)
            .and_then(|key| self.identities.get(&key))
            .cloned()
            .unwrap_or_default()
    }

    /// The current position of the element with `id`.
    pub fn index_of(&self, array_path: &FieldPath, id: ElementId) -> Option<usize> {
        let key = self.stable_key(array_path)?;
        self.identities.get(&key)?.iter().position(|e| *e == id)
    }

    /// Resolves an element id to its current indexed path.
    pub fn path_of(&self, array_path: &FieldPath, id: ElementId) -> StoreResult<FieldPath> {
        self.index_of(array_path, id)
            .map(|index| array_path.index(index))
            .ok_or_else(|| StoreError::UnknownElement {
                path: array_path.clone(),
                id: id.to_string(),
            })
    }

    /// Pins the array positions of `path` to the elements currently there.
    pub fn stable_path(&self, path: &FieldPath) -> Option<StablePath> {
        self.stable_key(path).map(StablePath)
    }

    /// The current indexed path of `stable`, or `None` once an element on
    /// it has been removed or replaced.
    pub fn resolve(&self, stable: &StablePath) -> Option<FieldPath> {
        let mut segments = Vec::with_capacity(stable.0.len());
        for (depth, segment) in stable.0.iter().enumerate() {
            match segment {
                StableSegment::Key(k) => segments.push(Segment::Key(k.clone())),
                StableSegment::Element(id) => {
                    let index = self.identities.get(&stable.0[..depth])?.iter().position(|e| e == id)?;
                    segments.push(Segment::Index(index));
                }
            }
        }
        Some(FieldPath::from_segments(segments))
    }

    /// Like [`Self::reconcile`], additionally syncing the id table of the
    /// array at `array_path` itself.
    fn sync_array(&mut self, array_path: &FieldPath) -> Option<StableKey> {
        let key = self.reconcile(array_path)?;
        let len = lookup(&self.root, array_path)?.as_array()?.len();
        let ids = self.identities.entry(key.clone()).or_default();
        ids.truncate(len);
        while ids.len() < len {
            ids.push(ElementId::new());
        }
        Some(key)
    }

    /// Translates an indexed path into its stable form without mutating.
    fn stable_key(&self, path: &FieldPath) -> Option<StableKey> {
        let mut key = Vec::with_capacity(path.len());
        for segment in path.segments() {
            match segment {
                Segment::Key(k) => key.push(StableSegment::Key(k.clone())),
                Segment::Index(i) => {
                    let id = *self.identities.get(&key)?.get(*i)?;
                    key.push(StableSegment::Element(id));
                }
            }
        }
        Some(key)
    }

    /// Brings the id tables of every array along `path` in line with the
    /// current array lengths and returns the stable form of `path`.
    fn reconcile(&mut self, path: &FieldPath) -> Option<StableKey> {
        let mut key: StableKey = Vec::with_capacity(path.len());
        let mut current: &Value = &self.root;
        for segment in path.segments() {
            match segment {
                Segment::Key(k) => {
                    current = current.get(k.as_str())?;
                    key.push(StableSegment::Key(k.clone()));
                }
                Segment::Index(i) => {
                    let Value::Array(items) = current else {
                        return None;
                    };
                    let ids = self.identities.entry(key.clone()).or_default();
                    ids.truncate(items.len());
                    while ids.len() < items.len() {
                        ids.push(ElementId::new());
                    }
                    let id = *ids.get(*i)?;
                    current = items.get(*i)?;
                    key.push(StableSegment::Element(id));
                }
            }
        }
        Some(key)
    }
}

/// Reads through `path`, returning `None` as soon as a segment is missing.
fn lookup<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match segment {
            Segment::Key(k) => current.as_object()?.get(k)?,
            Segment::Index(i) => current.as_array()?.get(*i)?,
        };
    }
    Some(current)
}

fn lookup_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match segment {
            Segment::Key(k) => current.as_object_mut()?.get_mut(k)?,
            Segment::Index(i) => current.as_array_mut()?.get_mut(*i)?,
        };
    }
    Some(current)
}

/// Dry run of [`slot_mut`] so a failing write leaves the tree untouched.
fn check_writable(root: &Value, path: &FieldPath) -> StoreResult<()> {
    let mut current = Some(root);
    for (depth, segment) in path.segments().iter().enumerate() {
        let here = || FieldPath::from_segments(path.segments()[..depth].to_vec());
        current = match (current, segment) {
            (None | Some(Value::Null), Segment::Key(_)) => None,
            (None | Some(Value::Null), Segment::Index(index)) => {
                if *index != 0 {
                    return Err(StoreError::IndexOutOfBounds {
                        path: here(),
                        index: *index,
                        len: 0,
                    });
                }
                None
            }
            (Some(Value::Object(map)), Segment::Key(k)) => map.get(k),
            (Some(Value::Array(items)), Segment::Index(index)) => {
                if *index > items.len() {
                    return Err(StoreError::IndexOutOfBounds {
                        path: here(),
                        index: *index,
                        len: items.len(),
                    });
                }
                items.get(*index)
            }
            (Some(_), Segment::Key(_)) => return Err(StoreError::NotAContainer { path: here() }),
            (Some(_), Segment::Index(_)) => return Err(StoreError::NotAnArray { path: here() }),
        };
    }
    Ok(())
}

/// Navigates to the slot at `path`, creating mappings, arrays and the
/// appended element on the way.
fn slot_mut<'a>(root: &'a mut Value, path: &FieldPath) -> StoreResult<&'a mut Value> {
    let mut current = root;
    for (depth, segment) in path.segments().iter().enumerate() {
        let here = || FieldPath::from_segments(path.segments()[..depth].to_vec());
        current = match segment {
            Segment::Key(key) => {
                if current.is_null() {
                    *current = Value::Object(Map::new());
                }
                match current {
                    Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                    _ => return Err(StoreError::NotAContainer { path: here() }),
                }
            }
            Segment::Index(index) => {
                if current.is_null() {
                    *current = Value::Array(Vec::new());
                }
                match current {
                    Value::Array(items) => {
                        let len = items.len();
                        if *index == len {
                            items.push(Value::Null);
                        } else if *index > len {
                            return Err(StoreError::IndexOutOfBounds {
                                path: here(),
                                index: *index,
                                len,
                            });
                        }
                        &mut items[*index]
                    }
                    _ => return Err(StoreError::NotAnArray { path: here() }),
                }
            }
        };
    }
    Ok(current)
}

fn index_subtree(identities: &mut HashMap<StableKey, Vec<ElementId>>, key: StableKey, value: &Value) {
    match value {
        Value::Array(items) => {
            let ids: Vec<ElementId> = items.iter().map(|_| ElementId::new()).collect();
            for (id, item) in ids.iter().zip(items) {
                let mut child = key.clone();
                child.push(StableSegment::Element(*id));
                index_subtree(identities, child, item);
            }
            identities.insert(key, ids);
        }
        Value::Object(map) => {
            for (k, v) in map {
                let mut child = key.clone();
                child.push(StableSegment::Key(k.clone()));
                index_subtree(identities, child, v);
            }
        }
        _ => {}
    }
}

fn drop_subtree(identities: &mut HashMap<StableKey, Vec<ElementId>>, prefix: &[StableSegment]) {
    identities.retain(|key, _| !key.starts_with(prefix));
}
