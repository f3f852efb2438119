use gtk::prelude::*;
use relm4::{
    actions::{ActionName, EmptyType, RelmAction, RelmActionGroup},
    menu, new_action_group, new_stateless_action,
    prelude::*,
};

/// Menu items, as delivered to the callback given to [attach].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MenuItem {
    Convert,
    CancelConversion,
    Quit,
    About,
}

new_action_group!(ConverterMenu, "converter");
new_stateless_action!(ConvertAction, ConverterMenu, "convert");
new_stateless_action!(CancelAction, ConverterMenu, "cancel");
new_stateless_action!(QuitAction, ConverterMenu, "quit");
new_stateless_action!(AboutAction, ConverterMenu, "about");

/// Builds the menu bar model, and sets it on the application once it has started.
pub fn install_on_startup(app: &gtk::Application) {
    menu! {
        menu_bar: {
            "File" {
                section! {
                    "Convert" => ConvertAction,
                    "Cancel conversion" => CancelAction,
                },
                section! {
                    "Quit" => QuitAction,
                },
            },
            "Help" {
                "About..." => AboutAction,
            },
        }
    }

    app.connect_startup(move |app| app.set_menubar(Some(&menu_bar)));
}

/// Makes the menu items active within `window`, reporting each activation to `on_item`.
pub fn attach<F>(window: &impl AsRef<gtk::Widget>, on_item: F)
where
    F: Fn(MenuItem) + Clone + 'static,
{
    let mut group = RelmActionGroup::<ConverterMenu>::new();
    connect(&mut group, ConvertAction, MenuItem::Convert, &on_item);
    connect(&mut group, CancelAction, MenuItem::CancelConversion, &on_item);
    connect(&mut group, QuitAction, MenuItem::Quit, &on_item);
    connect(&mut group, AboutAction, MenuItem::About, &on_item);
    group.register_for_widget(window);
}

fn connect<A, F>(
    group: &mut RelmActionGroup<ConverterMenu>,
    _action: A,
    item: MenuItem,
    on_item: &F,
) where
    A: ActionName<Group = ConverterMenu>,
    A::State: EmptyType,
    A::Target: EmptyType,
    F: Fn(MenuItem) + Clone + 'static,
{
    let on_item = on_item.clone();
    group.add_action(RelmAction::<A>::new_stateless(move |_| on_item(item)));
}
