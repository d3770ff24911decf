//! Given step definitions

use crate::world::ApiWorld;
use cucumber::given;

#[given(regex = r#"^I am authenticating as "([^"]*)" with "([^"]*)" password$"#)]
async fn authenticating_as(world: &mut ApiWorld, username: String, password: String) {
    world.context.authenticate_as(&username, &password);
}

#[given(regex = r#"^I set header "([^"]*)" with value "([^"]*)"$"#)]
async fn set_header(world: &mut ApiWorld, name: String, value: String) {
    world.context.set_header(&name, &value);
}

#[given(regex = r#"^I set placeholder "([^"]*)" with value "([^"]*)"$"#)]
async fn set_placeholder(world: &mut ApiWorld, key: String, value: String) {
    world.context.set_placeholder(&key, &value);
}
