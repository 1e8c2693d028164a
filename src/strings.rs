use std::collections::HashMap;

/// Resolves localized string indices to display text
///
/// Localized plugins store an index into an external string table instead of
/// inline text. One can implement `StringTable` for their own lookup or rely
/// on the HashMap implementation
///
/// ```
/// use std::collections::HashMap;
/// use tesfile::StringTable;
///
/// let mut map = HashMap::new();
/// map.insert(0xd502, String::from("Gold"));
///
/// assert_eq!(map.lookup(0xd502), Some("Gold"));
/// assert_eq!(map.lookup(0x0001), None);
/// ```
pub trait StringTable {
    /// Return the text of the given index if found
    fn lookup(&self, index: u32) -> Option<&str>;
}

impl<S, V> StringTable for HashMap<u32, V, S>
where
    S: ::std::hash::BuildHasher,
    V: AsRef<str>,
{
    fn lookup(&self, index: u32) -> Option<&str> {
        self.get(&index).map(|x| x.as_ref())
    }
}

impl<'a, T> StringTable for &'a T
where
    T: StringTable + ?Sized,
{
    fn lookup(&self, index: u32) -> Option<&str> {
        (**self).lookup(index)
    }
}
