use defmt::Format;
use pin_interface::PinHandle;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<P> {
    pub input: P,
    pub output: P,
}

impl<P> Route<P> {
    pub const fn new(input: P, output: P) -> Self {
        Self { input, output }
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingError<P> {
    /// An opened input has no route.
    Unrouted(P),
    /// A route reads a pin that is not an opened input.
    NotAnInput(P),
    /// A route drives a pin that is not an opened output.
    MissingOutput(P),
}

/// Fixed input to output lookup table. Every input appears in exactly one route.
#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMapping<P, const N: usize> {
    routes: [Route<P>; N],
}

impl<P: Copy + Eq, const N: usize> PinMapping<P, N> {
    pub fn new(routes: [Route<P>; N]) -> Self {
        assert!(N > 0);

        for (index, route) in routes.iter().enumerate() {
            assert!(
                !routes[..index].iter().any(|other| other.input == route.input),
                "input routed twice"
            );
            assert!(route.input != route.output, "route loops back on itself");
        }

        Self { routes }
    }

    pub fn routes(&self) -> &[Route<P>; N] {
        &self.routes
    }

    pub fn resolve(&self, input: P) -> Option<P> {
        self.index_of(input).map(|index| self.routes[index].output)
    }

    pub(crate) fn index_of(&self, input: P) -> Option<usize> {
        self.routes.iter().position(|route| route.input == input)
    }

    /// Checks the mapping against the opened switch and LED tables.
    pub fn validate(
        &self,
        inputs: &PinHandle<P>,
        outputs: &PinHandle<P>,
    ) -> Result<(), MappingError<P>>
    where
        P: 'static,
    {
        if let Some(config) = inputs.inputs().find(|config| self.resolve(config.pin).is_none()) {
            return Err(MappingError::Unrouted(config.pin));
        }

        for route in &self.routes {
            if !inputs.inputs().any(|config| config.pin == route.input) {
                return Err(MappingError::NotAnInput(route.input));
            }

            if !outputs.outputs().any(|config| config.pin == route.output) {
                return Err(MappingError::MissingOutput(route.output));
            }
        }

        Ok(())
    }
}
