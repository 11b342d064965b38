mod app_shell;
pub use app_shell::AppShell;

mod guard;

mod wizard;

mod home;
pub use home::Home;

mod sign_in;
pub use sign_in::SignIn;

mod complete_profile;
pub use complete_profile::CompleteProfile;

mod profile;
pub use profile::Profile;

mod my_services;
pub use my_services::MyServices;
