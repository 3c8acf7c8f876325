use std::fmt;

/// Full pages, rendered inside `layout.html`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    ListsIndex,
    ListsShow,
    Login,
    Register,
    NotFound,
    Error,
}

/// Fragments from a view directory, rendered without the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partial {
    ListCard,
    ListForm,
    ListCreated,
}

/// Fragments from the global `shared/` directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedPartial {
    ErrorMessage,
    FieldError,
}

impl View {
    pub const ALL: [View; 6] = [
        View::ListsIndex,
        View::ListsShow,
        View::Login,
        View::Register,
        View::NotFound,
        View::Error,
    ];

    pub fn directory(self) -> &'static str {
        match self {
            View::ListsIndex | View::ListsShow => "lists",
            View::Login | View::Register => "login",
            View::NotFound | View::Error => "errors",
        }
    }

    pub fn file(self) -> &'static str {
        match self {
            View::ListsIndex => "index.html",
            View::ListsShow => "show.html",
            View::Login => "login.html",
            View::Register => "register.html",
            View::NotFound => "not_found.html",
            View::Error => "error.html",
        }
    }

    pub fn template_name(self) -> String {
        format!("{}/{}", self.directory(), self.file())
    }
}

impl Partial {
    pub const ALL: [Partial; 3] = [Partial::ListCard, Partial::ListForm, Partial::ListCreated];

    pub fn directory(self) -> &'static str {
        match self {
            Partial::ListCard | Partial::ListForm | Partial::ListCreated => "lists",
        }
    }

    pub fn file(self) -> &'static str {
        match self {
            Partial::ListCard => "_card.html",
            Partial::ListForm => "_form.html",
            Partial::ListCreated => "_created.html",
        }
    }

    pub fn template_name(self) -> String {
        format!("{}/{}", self.directory(), self.file())
    }
}

impl SharedPartial {
    pub const ALL: [SharedPartial; 2] = [SharedPartial::ErrorMessage, SharedPartial::FieldError];

    pub fn file(self) -> &'static str {
        match self {
            SharedPartial::ErrorMessage => "_error_message.html",
            SharedPartial::FieldError => "_field_error.html",
        }
    }

    pub fn template_name(self) -> String {
        format!("{}/{}", super::SHARED_DIR, self.file())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template_name())
    }
}

impl fmt::Display for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template_name())
    }
}

impl fmt::Display for SharedPartial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template_name())
    }
}
