use std::{any::Any, marker::PhantomData};

///
/// Type-erased column of component values. Every archetype owns one per component of its signature.
///
pub trait ComponentStorage: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_mut_any(&mut self) -> &mut dyn Any;

    /// Number of rows in this column
    fn row_count(&self) -> usize;

    fn reserve(&mut self, additional: usize);

    /// Appends `count` default values
    fn extend_default(&mut self, count: usize);

    /// Swap-removes the value at `index`, dropping it
    fn remove(&mut self, index: usize);

    /// Swap-removes the value at `index` and pushes it into `dest`.
    /// `dest` must be a column of the same component type.
    fn move_to(&mut self, index: usize, dest: &mut dyn ComponentStorage);

    fn clear(&mut self);
}

#[derive(Default)]
pub struct TypedComponentStorage<T>
where
    T: Default + 'static,
{
    data: Vec<T>,
}

impl<T> TypedComponentStorage<T>
where
    T: Default + 'static,
{
    pub fn with_capacity(capacity: usize) -> Self {
        TypedComponentStorage {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn push(&mut self, value: T) -> usize {
        self.data.push(value);
        self.data.len() - 1
    }
}

impl<T> ComponentStorage for TypedComponentStorage<T>
where
    T: Default + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }

    fn row_count(&self) -> usize {
        self.data.len()
    }

    fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    fn extend_default(&mut self, count: usize) {
        self.data.resize_with(self.data.len() + count, T::default);
    }

    fn remove(&mut self, index: usize) {
        self.data.swap_remove(index);
    }

    fn move_to(&mut self, index: usize, dest: &mut dyn ComponentStorage) {
        let value = self.data.swap_remove(index);
        if let Some(dest) = try_cast_mut::<T>(dest) {
            dest.push(value);
        }
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}

#[inline]
pub fn try_cast<T>(storage: &dyn ComponentStorage) -> Option<&TypedComponentStorage<T>>
where
    T: Default + 'static,
{
    storage.as_any().downcast_ref::<TypedComponentStorage<T>>()
}

#[inline]
pub fn try_cast_mut<T>(storage: &mut dyn ComponentStorage) -> Option<&mut TypedComponentStorage<T>>
where
    T: Default + 'static,
{
    storage
        .as_mut_any()
        .downcast_mut::<TypedComponentStorage<T>>()
}

///
/// ColumnFactory
///
pub(crate) trait ColumnFactory {
    fn create(&self, capacity: usize) -> Box<dyn ComponentStorage>;
}

pub(crate) struct TypedColumnFactory<T>
where
    T: Default + 'static,
{
    _data: PhantomData<T>,
}

impl<T> TypedColumnFactory<T>
where
    T: Default + 'static,
{
    pub(crate) fn new() -> Self {
        TypedColumnFactory { _data: PhantomData }
    }
}

impl<T> ColumnFactory for TypedColumnFactory<T>
where
    T: Default + 'static,
{
    fn create(&self, capacity: usize) -> Box<dyn ComponentStorage> {
        Box::new(TypedComponentStorage::<T>::with_capacity(capacity))
    }
}
