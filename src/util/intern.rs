use std::{collections::HashMap, fmt, num::NonZeroU32, rc::Rc};

/// A handle to an interned string. To retrieve the `&str`, use
/// [`Interner::get`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    // NonZeroU32 keeps `Option<Symbol>` pointer-sized.
    handle: NonZeroU32,
}

impl Symbol {
    const fn unchecked_new(handle: NonZeroU32) -> Symbol {
        Symbol { handle }
    }

    fn index(self) -> usize {
        self.handle.get() as usize - 1
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.handle)
    }
}

/// Deduplicating string storage. Names are interned once and referred to by
/// cheap copyable [`Symbol`] handles thereafter.
pub struct Interner {
    map: HashMap<Rc<str>, NonZeroU32>,
    vec: Vec<Rc<str>>,
}

impl Interner {
    pub fn with_capacity(capacity: usize) -> Interner {
        Interner {
            map: HashMap::with_capacity(capacity),
            vec: Vec::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Interns the provided string, returning a handle which can be used to
    /// retrieve it later. Interning the same string twice yields the same
    /// handle.
    pub fn intern(&mut self, value: &str) -> Symbol {
        if let Some(&handle) = self.map.get(value) {
            return Symbol::unchecked_new(handle);
        }
        let key: Rc<str> = value.into();
        let len = u32::try_from(self.vec.len() + 1).expect("interner out of capacity");
        // The +1 above guarantees a non-zero value.
        let handle = NonZeroU32::new(len).unwrap();
        self.vec.push(Rc::clone(&key));
        self.map.insert(key, handle);
        Symbol::unchecked_new(handle)
    }

    /// Returns the string for the provided [`Symbol`] handle. Panics if the
    /// handle was produced by another interner.
    pub fn get(&self, handle: impl Into<Symbol>) -> &str {
        let handle: Symbol = handle.into();
        &self.vec[handle.index()]
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, interned) in self.vec.iter().enumerate() {
            map.entry(&(i + 1), interned);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner() {
        let mut i = Interner::with_capacity(3);

        let hello1 = i.intern("hello");
        let world1 = i.intern("world");
        let bang1 = i.intern("!");

        let hello2 = i.intern("hello");
        let world2 = i.intern("world");
        let bang2 = i.intern("!");

        assert_eq!(hello1, hello2);
        assert_eq!(world1, world2);
        assert_eq!(bang1, bang2);
        assert_ne!(hello1, world1);

        assert_eq!(i.get(hello1), "hello");
        assert_eq!(i.get(world1), "world");
        assert_eq!(i.get(bang1), "!");
    }
}
