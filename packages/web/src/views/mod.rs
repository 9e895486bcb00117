mod landing;
pub use landing::Landing;

mod login;
pub use login::Login;

mod profile;
pub use profile::ProfilePage;
