// Current admin profile.

use crate::console::Console;

impl Console {
    pub fn current_user_id(&self) -> Option<String> {
        self.current_user().map(|u| u.id.clone())
    }
}
