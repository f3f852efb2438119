use gtk::prelude::*;
use relm4::gtk;
use relm4::prelude::*;

/// Modal dialog box for informational messages, such as a completed conversion.
pub struct InfoDialog {
    hidden: bool,
    heading: String,
    message: String,
}

/// Input messages for [InfoDialog].
#[derive(Debug)]
pub enum Input {
    Show { heading: String, message: String },
    // Internal:
    Closed,
}

#[relm4::component(pub)]
impl SimpleComponent for InfoDialog {
    type Input = Input;
    type Output = ();
    type Init = ();

    view! {
        #[root]
        gtk::MessageDialog {
            set_modal: true,
            set_message_type: gtk::MessageType::Info,
            #[watch]
            set_visible: !model.hidden,
            #[watch]
            set_text: Some(&model.heading),
            #[watch]
            set_secondary_text: Some(&model.message),
            add_button: ("OK", gtk::ResponseType::Ok),

            connect_response[sender] => move |_, _| {
                sender.input(Input::Closed);
            }
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = Self {
            hidden: true,
            heading: "".into(),
            message: "".into(),
        };
        let widgets = view_output!();
        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, _sender: ComponentSender<Self>) {
        match message {
            Input::Show { heading, message } => {
                self.heading = heading;
                self.message = message;
                self.hidden = false;
            }
            Input::Closed => {
                self.hidden = true;
            }
        }
    }
}
