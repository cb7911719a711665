use std::collections::HashMap;

use crate::component::Component;
use crate::screen::ScreenId;

pub mod login;
pub mod products;

pub use login::LoginScreen;
pub use products::ProductsScreen;

/// One component per screen, keyed by id.
pub fn create_screens() -> HashMap<ScreenId, Box<dyn Component>> {
    let mut screens: HashMap<ScreenId, Box<dyn Component>> = HashMap::new();
    screens.insert(ScreenId::Login, Box::new(LoginScreen::new()));
    screens.insert(ScreenId::Products, Box::new(ProductsScreen::new()));
    screens
}
