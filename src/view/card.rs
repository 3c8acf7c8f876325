use serde::Serialize;

use crate::database::List;

/// A list as the templates see it, with its DOM id and URLs precomputed
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: String,
    pub selector: String,
    pub list_url: String,
    pub edit_url: String,
    pub editing_name: bool,
    pub list: List,
}

impl Card {
    pub fn new(list: List) -> Self {
        Self {
            id: format!("card-{}", list.id),
            selector: format!("#card-{}", list.id),
            list_url: format!("/lists/{}", list.id),
            edit_url: format!("/lists/{}/edit", list.id),
            editing_name: false,
            list,
        }
    }

    pub fn editing(list: List) -> Self {
        Self {
            editing_name: true,
            ..Self::new(list)
        }
    }
}

impl From<List> for Card {
    fn from(list: List) -> Self {
        Card::new(list)
    }
}

/// State of the "new list" form
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewListForm {
    pub name: String,
    pub error: Option<String>,
    /// Render for an out-of-band swap, replacing the form already on the page
    pub swap_oob: bool,
}

impl NewListForm {
    pub fn rejected(name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            name: name.into(),
            error: Some(error.to_string()),
            swap_oob: false,
        }
    }

    /// Empty form sent alongside a newly created card
    pub fn reset() -> Self {
        Self {
            swap_oob: true,
            ..Self::default()
        }
    }
}
