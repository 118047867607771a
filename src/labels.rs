use std::fmt;

use crate::air::InstrPtr;

/// Default amount of buckets for a program's label table.
pub const LABEL_TABLE_CAPACITY: usize = 64;

/// A label name bound to the instruction it precedes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Entry {
    pub name: String,
    pub ptr: InstrPtr,
}

/// Returned when a label is registered twice. The first binding is kept.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DuplicateLabel(pub String);

impl fmt::Display for DuplicateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label `{}` is already defined", self.0)
    }
}

impl std::error::Error for DuplicateLabel {}

/// Chained hash table of label name -> instruction pointer.
///
/// The hash is the byte sum of the name, which is plenty for the handful of symbols an assembly
/// file defines. Registration is first-writer-wins.
#[derive(Debug)]
pub struct LabelTable {
    buckets: Box<[Vec<Entry>]>,
    len: usize,
}

impl LabelTable {
    /// Zero buckets is bumped to one so hashing is always defined.
    pub fn with_capacity(capacity: usize) -> Self {
        let buckets = (0..capacity.max(1)).map(|_| Vec::new()).collect();
        LabelTable { buckets, len: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket(&self, name: &str) -> usize {
        let sum = name
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_add(b as usize));
        sum % self.buckets.len()
    }

    /// Bind `name` to `ptr`. Fails without touching the table if `name` is already bound.
    pub fn put(&mut self, name: &str, ptr: InstrPtr) -> Result<(), DuplicateLabel> {
        let idx = self.bucket(name);
        let chain = &mut self.buckets[idx];
        if chain.iter().any(|entry| entry.name == name) {
            return Err(DuplicateLabel(name.to_string()));
        }
        chain.push(Entry {
            name: name.to_string(),
            ptr,
        });
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        // Newest entry is the head of the chain
        self.buckets[self.bucket(name)]
            .iter()
            .rev()
            .find(|entry| entry.name == name)
    }

    pub fn lookup(&self, name: &str) -> Option<InstrPtr> {
        self.get(name).map(|entry| entry.ptr)
    }

    /// All entries, ordered by the instruction they point to.
    pub fn entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<_> = self.buckets.iter().flatten().collect();
        entries.sort_by(|a, b| a.ptr.cmp(&b.ptr).then_with(|| a.name.cmp(&b.name)));
        entries
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        LabelTable::with_capacity(LABEL_TABLE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get() {
        let mut table = LabelTable::with_capacity(8);
        table.put("main", InstrPtr(0)).unwrap();
        table.put("loop", InstrPtr(3)).unwrap();
        assert_eq!(table.lookup("main"), Some(InstrPtr(0)));
        assert_eq!(table.lookup("loop"), Some(InstrPtr(3)));
        assert_eq!(table.lookup("missing"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn first_writer_wins() {
        let mut table = LabelTable::default();
        table.put("f", InstrPtr(1)).unwrap();
        assert_eq!(table.put("f", InstrPtr(9)), Err(DuplicateLabel("f".into())));
        assert_eq!(table.lookup("f"), Some(InstrPtr(1)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn colliding_names() {
        // Anagrams share a byte sum, so they always land in the same bucket
        let mut table = LabelTable::with_capacity(16);
        table.put("abc", InstrPtr(0)).unwrap();
        table.put("cba", InstrPtr(1)).unwrap();
        table.put("bca", InstrPtr(2)).unwrap();
        assert_eq!(table.lookup("abc"), Some(InstrPtr(0)));
        assert_eq!(table.lookup("cba"), Some(InstrPtr(1)));
        assert_eq!(table.lookup("bca"), Some(InstrPtr(2)));
        assert_eq!(table.lookup("acb"), None);
    }

    #[test]
    fn zero_capacity() {
        let mut table = LabelTable::with_capacity(0);
        assert_eq!(table.capacity(), 1);
        table.put("a", InstrPtr(0)).unwrap();
        table.put("b", InstrPtr(1)).unwrap();
        assert_eq!(table.lookup("b"), Some(InstrPtr(1)));
    }

    #[test]
    fn entries_in_program_order() {
        let mut table = LabelTable::default();
        table.put("end", InstrPtr(7)).unwrap();
        table.put("start", InstrPtr(0)).unwrap();
        table.put("alias", InstrPtr(0)).unwrap();
        let names: Vec<_> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alias", "start", "end"]);
    }
}
