use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Focus,
    Common,
    ProperName,
    Rare,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Common => "jōyō",
            Self::ProperName => "jinmeiyō",
            Self::Rare => "rare",
        }
    }
}

/// Membership lists behind the tier classification. Tier is a pure function
/// of the character id and the currently focused id; the old focus reverts to
/// its list-driven tier as soon as focus moves elsewhere.
#[derive(Clone, Debug, Default)]
pub struct TierLists {
    common: HashSet<String>,
    proper_name: HashSet<String>,
}

impl TierLists {
    pub fn new(common: Vec<String>, proper_name: Vec<String>) -> Self {
        Self {
            common: common.into_iter().collect(),
            proper_name: proper_name.into_iter().collect(),
        }
    }

    pub fn classify(&self, id: &str, focus_id: &str) -> Tier {
        if id == focus_id {
            Tier::Focus
        } else {
            self.membership(id)
        }
    }

    /// The list-driven tier alone, ignoring focus.
    pub fn membership(&self, id: &str) -> Tier {
        if self.common.contains(id) {
            Tier::Common
        } else if self.proper_name.contains(id) {
            Tier::ProperName
        } else {
            Tier::Rare
        }
    }

    pub fn common_count(&self) -> usize {
        self.common.len()
    }

    pub fn proper_name_count(&self) -> usize {
        self.proper_name.len()
    }
}
