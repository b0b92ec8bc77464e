/// Resolves the subject acting behind an incoming request
///
/// A resolver may verify presented credentials, introspect a token or look
/// up a session. Callers only see the outcome: an authenticated subject, or
/// none when the flow has no resource owner.
pub trait Resolver {
    /// The request context the subject is resolved from
    type Input: ?Sized;

    /// The authenticated subject
    type Subject;

    /// The error returned when resolution could not complete
    type Error;

    /// Resolves the subject for the given input
    ///
    /// # Errors
    ///
    /// Returns an error if the subject could not be resolved. An absent
    /// subject is reported as `Ok(None)`, not as an error.
    fn resolve(&self, input: &Self::Input) -> Result<Option<Self::Subject>, Self::Error>;
}

impl<T> Resolver for &'_ T
where
    T: Resolver + ?Sized,
{
    type Input = T::Input;
    type Subject = T::Subject;
    type Error = T::Error;

    #[inline]
    fn resolve(&self, input: &Self::Input) -> Result<Option<Self::Subject>, Self::Error> {
        T::resolve(self, input)
    }
}
