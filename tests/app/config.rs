/// Settings shared by the application's services.
pub struct Settings {
    pub sender: String,
}
