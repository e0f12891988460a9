use std::mem::MaybeUninit;

use union_core::union::{RawUnion, Walk};
use union_core::wrapper::Tag;
use union_core::NPOS;

use super::{CloneSlot, Storage};

/// A union followed by a tag of type `T`.
pub struct NormalStorage<U: RawUnion, T: Tag = u8> {
    value: MaybeUninit<U>,
    tag: T,
}

impl<U: RawUnion, T: Tag> NormalStorage<U, T> {
    const FITS: () = assert!(
        U::LEN <= T::CAPACITY,
        "too many alternatives for the tag type"
    );
}

unsafe impl<U: RawUnion, T: Tag> Storage for NormalStorage<U, T> {
    type Union = U;

    #[inline]
    fn valueless() -> Self {
        let () = Self::FITS;

        NormalStorage {
            value: MaybeUninit::uninit(),
            tag: T::NPOS,
        }
    }

    #[inline]
    fn index(&self) -> usize {
        self.tag.to_index()
    }

    #[inline]
    fn union_ptr(&self) -> *const U {
        self.value.as_ptr()
    }

    #[inline]
    fn union_mut_ptr(&mut self) -> *mut U {
        self.value.as_mut_ptr()
    }

    #[inline]
    unsafe fn commit(&mut self, index: usize) {
        debug_assert!(index < U::LEN);
        self.tag = T::from_index(index);
    }

    #[inline]
    fn mark_valueless(&mut self) {
        self.tag = T::NPOS;
    }
}

impl<U: RawUnion, T: Tag> Drop for NormalStorage<U, T> {
    #[inline]
    fn drop(&mut self) {
        self.reset()
    }
}

impl<U, T> Clone for NormalStorage<U, T>
where
    U: RawUnion + Walk<CloneSlot<U>>,
    T: Tag,
{
    fn clone(&self) -> Self {
        let mut out = Self::valueless();
        out.clone_from(self);
        out
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();

        let index = source.index();
        if index != NPOS {
            // `source` is only read through the pointer.
            let value = unsafe { U::walk(source.union_ptr() as *mut U, index, CloneSlot::new()) };
            self.value = value;
            self.tag = source.tag;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use union_core::index::{I0, I1, I2};
    use union_core::list::IntoSlots;
    use union_core::union::{Generated, Get, Recursive};
    use union_core::wrapper::Slot;
    use union_core::List;

    use std::mem;
    use std::rc::Rc;

    type U = Generated<<List![u8, Rc<()>, String] as IntoSlots>::Bare, Recursive>;

    fn holding_string(value: &str) -> NormalStorage<U> {
        let mut storage = NormalStorage::<U>::valueless();
        unsafe {
            <U as Get<I2>>::slot(storage.union_mut_ptr()).write(Slot::new(value.to_string()));
            storage.commit(2);
        }
        storage
    }

    #[test]
    fn test_valueless() {
        let storage = NormalStorage::<U>::valueless();

        assert_eq!(storage.index(), NPOS);
        assert!(storage.is_valueless());
    }

    #[test]
    fn test_commit_and_clone() {
        let storage = holding_string("normal");
        let clone = storage.clone();

        assert_eq!(clone.index(), 2);
        let value = unsafe { &*<U as Get<I2>>::slot(clone.union_ptr() as *mut U) };
        assert_eq!(value.0, "normal");
    }

    #[test]
    fn test_reset_drops() {
        let rc = Rc::new(());
        let mut storage = NormalStorage::<U>::valueless();
        unsafe {
            <U as Get<I1>>::slot(storage.union_mut_ptr()).write(Slot::new(rc.clone()));
            storage.commit(1);
        }
        assert_eq!(Rc::strong_count(&rc), 2);

        storage.reset();
        assert_eq!(Rc::strong_count(&rc), 1);
        assert!(storage.is_valueless());

        storage.reset();
        assert_eq!(Rc::strong_count(&rc), 1);
    }

    #[test]
    fn test_clone_from_replaces() {
        let mut target = NormalStorage::<U>::valueless();
        unsafe {
            <U as Get<I0>>::slot(target.union_mut_ptr()).write(Slot::new(9));
            target.commit(0);
        }

        target.clone_from(&holding_string("replaced"));
        assert_eq!(target.index(), 2);
    }

    #[test]
    fn test_layout() {
        assert_eq!(
            mem::size_of::<NormalStorage<U>>(),
            mem::size_of::<String>() + mem::align_of::<String>()
        );
    }
}
