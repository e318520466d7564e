//! Interaction state of a cookbook session.
//!
//! The session is always in exactly one [`ViewState`]; named [`Action`]s move
//! it between states. Actions that make no sense in the current state are
//! rejected and leave the state untouched.

use std::fmt;

use crate::error::{Error, Result};
use crate::recipe::RecipeId;

/// What the user is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// The recipe list with nothing selected.
    #[default]
    Browsing,
    /// A single recipe.
    Viewing(RecipeId),
    /// The edit form of a recipe.
    Editing(RecipeId),
    /// Waiting for the user to confirm deleting a recipe.
    ConfirmingDelete(RecipeId),
    /// The form for a new recipe.
    Adding,
}

impl ViewState {
    /// The recipe this state is about, if any.
    #[must_use]
    pub fn selected(&self) -> Option<RecipeId> {
        match self {
            Self::Viewing(id) | Self::Editing(id) | Self::ConfirmingDelete(id) => Some(*id),
            Self::Browsing | Self::Adding => None,
        }
    }

    /// The state `action` leads to, or `None` if it is not allowed here.
    #[must_use]
    pub fn next(&self, action: Action) -> Option<Self> {
        use Action as A;
        use ViewState as S;

        match (*self, action) {
            // A pending delete must be confirmed or cancelled first.
            (S::ConfirmingDelete(_), A::ConfirmDelete) => Some(S::Browsing),
            (S::ConfirmingDelete(id), A::Cancel) => Some(S::Viewing(id)),
            (S::ConfirmingDelete(_), _) => None,

            (_, A::Select(id) | A::Random(id)) => Some(S::Viewing(id)),
            (_, A::New) => Some(S::Adding),

            (S::Viewing(id), A::Edit) => Some(S::Editing(id)),
            (S::Editing(current), A::Save(saved)) if current == saved => Some(S::Viewing(saved)),
            (S::Adding, A::Save(saved)) => Some(S::Viewing(saved)),
            (S::Viewing(id) | S::Editing(id), A::RequestDelete) => Some(S::ConfirmingDelete(id)),

            (S::Editing(id), A::Cancel) => Some(S::Viewing(id)),
            (S::Viewing(_) | S::Adding, A::Cancel) => Some(S::Browsing),

            _ => None,
        }
    }

    /// Apply `action`, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the action is not allowed in
    /// this state.
    pub fn apply(self, action: Action) -> Result<Self> {
        self.next(action).ok_or(Error::InvalidTransition {
            state: self,
            action,
        })
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browsing => write!(f, "browsing"),
            Self::Viewing(id) => write!(f, "viewing {}", id.short()),
            Self::Editing(id) => write!(f, "editing {}", id.short()),
            Self::ConfirmingDelete(id) => write!(f, "confirming delete of {}", id.short()),
            Self::Adding => write!(f, "adding a recipe"),
        }
    }
}

/// A user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open a recipe from the list.
    Select(RecipeId),
    /// Open the new-recipe form.
    New,
    /// Open a randomly chosen recipe.
    Random(RecipeId),
    /// Switch the open recipe to edit mode.
    Edit,
    /// A save succeeded for the given recipe.
    Save(RecipeId),
    /// Ask to delete the open recipe.
    RequestDelete,
    /// Confirm the pending delete.
    ConfirmDelete,
    /// Back out of the current form or prompt.
    Cancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(_) => write!(f, "select a recipe"),
            Self::New => write!(f, "start a new recipe"),
            Self::Random(_) => write!(f, "pick a random recipe"),
            Self::Edit => write!(f, "edit"),
            Self::Save(_) => write!(f, "save"),
            Self::RequestDelete => write!(f, "delete"),
            Self::ConfirmDelete => write!(f, "confirm delete"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}
