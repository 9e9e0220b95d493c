//! Typed access to one collection of a [`DocumentStore`].

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{DocumentStore, Filter};
use crate::error::Result;

/// A record type kept in its own collection.
pub trait Document: Serialize + DeserializeOwned {
    /// Name of the collection holding records of this type.
    const COLLECTION: &'static str;

    /// Primary key.
    fn id(&self) -> &str;
}

/// A store viewed as a collection of `T` records.
pub struct Collection<'s, S: ?Sized, T> {
    store: &'s S,
    marker: PhantomData<fn() -> T>,
}

impl<S: ?Sized, T> fmt::Debug for Collection<'_, S, T>
where
    T: Document,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &T::COLLECTION)
            .finish_non_exhaustive()
    }
}

impl<'s, S, T> Collection<'s, S, T>
where
    S: DocumentStore + ?Sized,
    T: Document,
{
    /// View `store` as a collection of `T`.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }

    /// Records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a record does not decode.
    pub fn find(&self, filter: &Filter) -> Result<Vec<T>> {
        self.store
            .find(T::COLLECTION, filter)?
            .into_iter()
            .map(|value| Ok(serde_json::from_value(value)?))
            .collect()
    }

    /// Every record in the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a record does not decode.
    pub fn all(&self) -> Result<Vec<T>> {
        self.find(&Filter::all())
    }

    /// The record with primary key `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the record does not decode.
    pub fn get(&self, id: &str) -> Result<Option<T>> {
        self.store
            .get(T::COLLECTION, id)?
            .map(|value| Ok(serde_json::from_value(value)?))
            .transpose()
    }

    /// Insert a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or the insert fails.
    pub fn create(&self, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.store.create(T::COLLECTION, &value)
    }

    /// Merge a partial record into the record with primary key `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch cannot be encoded or the record is missing.
    pub fn update<P: Serialize + ?Sized>(&self, id: &str, patch: &P) -> Result<()> {
        let value = serde_json::to_value(patch)?;
        self.store.update(T::COLLECTION, id, &value)
    }

    /// Delete a record. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove(&self, id: &str) -> Result<bool> {
        self.store.remove(T::COLLECTION, id)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::storage::Storage;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        text: String,
        #[serde(default)]
        pinned: bool,
    }

    impl Document for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
            pinned: false,
        }
    }

    #[test]
    fn test_create_get_and_all() {
        let storage = Storage::open_in_memory().unwrap();
        let notes: Collection<'_, _, Note> = Collection::new(&storage);

        notes.create(&note("n1", "first")).unwrap();
        notes.create(&note("n2", "second")).unwrap();

        assert_eq!(notes.get("n1").unwrap(), Some(note("n1", "first")));
        assert_eq!(notes.all().unwrap().len(), 2);
        assert!(notes.get("n3").unwrap().is_none());
    }

    #[test]
    fn test_update_with_partial() {
        let storage = Storage::open_in_memory().unwrap();
        let notes: Collection<'_, _, Note> = Collection::new(&storage);
        notes.create(&note("n1", "first")).unwrap();

        notes
            .update("n1", &serde_json::json!({ "pinned": true }))
            .unwrap();

        let stored = notes.get("n1").unwrap().unwrap();
        assert!(stored.pinned);
        assert_eq!(stored.text, "first");
    }

    #[test]
    fn test_find_and_remove() {
        let storage = Storage::open_in_memory().unwrap();
        let notes: Collection<'_, _, Note> = Collection::new(&storage);
        notes.create(&note("n1", "keep")).unwrap();
        notes.create(&note("n2", "drop")).unwrap();

        let found = notes.find(&Filter::new().eq("text", "drop")).unwrap();
        assert_eq!(found, vec![note("n2", "drop")]);

        assert!(notes.remove("n2").unwrap());
        assert_eq!(notes.all().unwrap(), vec![note("n1", "keep")]);
    }

    #[test]
    fn test_debug_names_collection() {
        let storage = Storage::open_in_memory().unwrap();
        let notes: Collection<'_, _, Note> = Collection::new(&storage);
        assert!(format!("{notes:?}").contains("notes"));
    }
}
