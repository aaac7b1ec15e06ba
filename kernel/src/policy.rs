use crate::entity::{User, UserId, UserRole};

/// Someone whose identity the caller has already established.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Actor {
    id: UserId,
    role: UserRole,
}

impl Actor {
    pub fn new(id: UserId, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn role(&self) -> UserRole {
        self.role
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id().clone(), *user.role())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Action {
    Read,
    Create,
    Update,
    Destroy,
    Borrow,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Resource<'a> {
    Book,
    Dashboard,
    /// A single borrow, identified by who holds it.
    Borrow { borrower_id: &'a UserId },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum ResourceKind {
    Book,
    Dashboard,
    Borrow,
}

impl Resource<'_> {
    fn kind(&self) -> ResourceKind {
        match self {
            Resource::Book => ResourceKind::Book,
            Resource::Dashboard => ResourceKind::Dashboard,
            Resource::Borrow { .. } => ResourceKind::Borrow,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Condition {
    Always,
    OwnBorrow,
}

struct Rule {
    roles: &'static [UserRole],
    actions: &'static [Action],
    resource: ResourceKind,
    condition: Condition,
    allow: bool,
}

const ANY_ROLE: &[UserRole] = &[UserRole::Member, UserRole::Librarian];
const LIBRARIAN: &[UserRole] = &[UserRole::Librarian];
const MEMBER: &[UserRole] = &[UserRole::Member];
const MANAGE: &[Action] = &[Action::Create, Action::Update, Action::Destroy];

// Ordered; the first rule whose role, action and resource match decides.
const RULES: &[Rule] = &[
    Rule {
        roles: ANY_ROLE,
        actions: &[Action::Read],
        resource: ResourceKind::Book,
        condition: Condition::Always,
        allow: true,
    },
    Rule {
        roles: ANY_ROLE,
        actions: &[Action::Read],
        resource: ResourceKind::Dashboard,
        condition: Condition::Always,
        allow: true,
    },
    Rule {
        roles: ANY_ROLE,
        actions: &[Action::Borrow],
        resource: ResourceKind::Book,
        condition: Condition::Always,
        allow: true,
    },
    Rule {
        roles: LIBRARIAN,
        actions: MANAGE,
        resource: ResourceKind::Book,
        condition: Condition::Always,
        allow: true,
    },
    Rule {
        roles: MEMBER,
        actions: MANAGE,
        resource: ResourceKind::Book,
        condition: Condition::Always,
        allow: false,
    },
    Rule {
        roles: LIBRARIAN,
        actions: &[Action::Update],
        resource: ResourceKind::Borrow,
        condition: Condition::Always,
        allow: true,
    },
    Rule {
        roles: MEMBER,
        actions: &[Action::Update],
        resource: ResourceKind::Borrow,
        condition: Condition::Always,
        allow: false,
    },
    Rule {
        roles: MEMBER,
        actions: &[Action::Read],
        resource: ResourceKind::Borrow,
        condition: Condition::OwnBorrow,
        allow: true,
    },
    Rule {
        roles: LIBRARIAN,
        actions: &[Action::Read],
        resource: ResourceKind::Borrow,
        condition: Condition::Always,
        allow: true,
    },
];

/// Stateless authorization table consulted by callers before they invoke the core.
pub struct AccessPolicy;

impl AccessPolicy {
    /// `None` is an unauthenticated caller, which is never allowed anything.
    pub fn allowed(actor: Option<&Actor>, action: Action, resource: Resource<'_>) -> bool {
        let Some(actor) = actor else {
            return false;
        };
        let kind = resource.kind();
        RULES
            .iter()
            .find(|rule| {
                rule.roles.contains(&actor.role)
                    && rule.actions.contains(&action)
                    && rule.resource == kind
            })
            .map(|rule| rule.allow && Self::satisfies(rule.condition, actor, &resource))
            .unwrap_or(false)
    }

    fn satisfies(condition: Condition, actor: &Actor, resource: &Resource<'_>) -> bool {
        match (condition, resource) {
            (Condition::Always, _) => true,
            (Condition::OwnBorrow, Resource::Borrow { borrower_id }) => *borrower_id == &actor.id,
            (Condition::OwnBorrow, _) => false,
        }
    }
}
