/// An access policy that decides whether a request is acceptable
///
/// A policy is a pure decision. Evaluating the same request against the same
/// policy must always produce the same outcome.
pub trait Policy {
    /// The request being evaluated
    type Request: ?Sized;

    /// The reason a request was denied
    type Denial;

    /// Evaluates the request against the policy
    ///
    /// # Errors
    ///
    /// Returns the denial if the policy does not permit the request.
    fn evaluate(&self, request: &Self::Request) -> Result<(), Self::Denial>;
}

impl<T> Policy for &'_ T
where
    T: Policy + ?Sized,
{
    type Request = T::Request;
    type Denial = T::Denial;

    #[inline]
    fn evaluate(&self, request: &Self::Request) -> Result<(), Self::Denial> {
        T::evaluate(self, request)
    }
}
