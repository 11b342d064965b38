/// Places the client can send the user to.
///
/// The router in the `web` crate maps each variant onto its `Route`; the
/// logic in this crate only ever talks in destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Home,
    SignIn,
    CompleteProfile,
    Profile,
    MyServices,
}

impl Destination {
    pub fn path(self) -> &'static str {
        match self {
            Destination::Home => "/",
            Destination::SignIn => "/signin",
            Destination::CompleteProfile => "/complete-profile",
            Destination::Profile => "/profile",
            Destination::MyServices => "/my-services",
        }
    }
}
