use std::sync::Arc;

/// A read-only source of previously registered records
///
/// Directories back the lookups an authorization gateway performs before it
/// can make a decision, such as finding a client by its identifier. Caching,
/// persistence and consistency are the concern of the implementation.
pub trait Directory {
    /// The key used to look up a record
    type Key: ?Sized;

    /// The record held by the directory
    type Record;

    /// The error returned when the directory cannot be consulted
    type Error;

    /// Finds the record registered under `key`
    ///
    /// An unknown key is not an error and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store could not be consulted.
    fn find(&self, key: &Self::Key) -> Result<Option<Self::Record>, Self::Error>;
}

impl<T> Directory for &'_ T
where
    T: Directory + ?Sized,
{
    type Key = T::Key;
    type Record = T::Record;
    type Error = T::Error;

    #[inline]
    fn find(&self, key: &Self::Key) -> Result<Option<Self::Record>, Self::Error> {
        T::find(self, key)
    }
}

impl<T> Directory for Arc<T>
where
    T: Directory + ?Sized,
{
    type Key = T::Key;
    type Record = T::Record;
    type Error = T::Error;

    #[inline]
    fn find(&self, key: &Self::Key) -> Result<Option<Self::Record>, Self::Error> {
        T::find(self, key)
    }
}
