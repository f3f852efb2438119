use gtk::prelude::*;
use relm4::gtk;
use relm4::prelude::*;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    /// The user can correct something and try again.
    Warning,
    Error,
}

impl Severity {
    fn heading(self) -> &'static str {
        match self {
            Severity::Warning => "Cannot convert",
            Severity::Error => "Error",
        }
    }

    fn message_type(self) -> gtk::MessageType {
        match self {
            Severity::Warning => gtk::MessageType::Warning,
            Severity::Error => gtk::MessageType::Error,
        }
    }
}

/// Modal dialog box for warning and error messages.
pub struct ErrorDialog {
    hidden: bool,
    severity: Severity,
    message: String,
}

/// Input messages for [ErrorDialog].
#[derive(Debug)]
pub enum Input {
    Show { severity: Severity, message: String },
    // Internal:
    Acknowledged,
}

#[relm4::component(pub)]
impl SimpleComponent for ErrorDialog {
    type Input = Input;
    type Output = ();
    type Init = ();

    view! {
        #[root]
        gtk::MessageDialog {
            set_modal: true,
            #[watch]
            set_visible: !model.hidden,
            #[watch]
            set_message_type: model.severity.message_type(),
            #[watch]
            set_text: Some(model.severity.heading()),
            #[watch]
            set_secondary_text: Some(&model.message),
            add_button: ("Acknowledge", gtk::ResponseType::Accept),

            connect_response[sender] => move |_, _| {
                sender.input(Input::Acknowledged);
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
            severity: Severity::Error,
            message: "".into(),
        };
        let widgets = view_output!();
        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, _sender: ComponentSender<Self>) {
        match message {
            Input::Show { severity, message } => {
                self.severity = severity;
                self.message = message;
                self.hidden = false;
            }
            Input::Acknowledged => {
                self.hidden = true;
            }
        }
    }
}
