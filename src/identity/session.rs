use serde::{Deserialize, Serialize};

use super::ActorId;

/// Who is using the portal. A UI-routing input, not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Engineer,
}

/// The views a session can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    History,
    Tasks,
    Onboarding,
}

impl View {
    /// Which role a view belongs to. Exhaustive on purpose: adding a view
    /// forces a decision here.
    pub fn allowed_for(self, role: Role) -> bool {
        match (role, self) {
            (Role::Customer, View::Dashboard | View::History) => true,
            (Role::Customer, View::Tasks | View::Onboarding) => false,
            (Role::Engineer, View::Tasks | View::Onboarding) => true,
            (Role::Engineer, View::Dashboard | View::History) => false,
        }
    }

    /// Landing view right after login.
    pub fn default_for(role: Role) -> View {
        match role {
            Role::Customer => View::Dashboard,
            Role::Engineer => View::Tasks,
        }
    }
}

/// Explicit session state. Mutated only through `reduce`; nothing else in
/// the engine holds session globals.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub authenticated: bool,
    pub role: Role,
    pub actor: Option<ActorId>,
    pub view: View,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            authenticated: false,
            role: Role::Customer,
            actor: None,
            view: View::Dashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    LoggedIn { role: Role },
    LoggedOut,
    SwitchView(View),
    AuthStateChanged(Option<ActorId>),
}

/// Session reducer: every action yields the next state, ignoring actions
/// that are not valid for the current one (e.g. a view the role cannot see).
pub fn reduce(state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::LoggedIn { role } => SessionState {
            authenticated: true,
            role,
            view: View::default_for(role),
            ..state
        },
        SessionAction::LoggedOut => SessionState {
            authenticated: false,
            view: View::Dashboard,
            // Store-level identity outlives the portal login.
            ..state
        },
        SessionAction::SwitchView(view) => {
            if state.authenticated && view.allowed_for(state.role) {
                SessionState { view, ..state }
            } else {
                state
            }
        }
        SessionAction::AuthStateChanged(actor) => SessionState { actor, ..state },
    }
}
