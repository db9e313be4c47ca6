/// Discrete phase of a cast's lifecycle.
///
/// ```text
/// Initialization ─▶ Targeting ─┬─▶ TargetingFailed
///                              ├─▶ PreCasting ─▶ Casting ─┬─▶ CastFail
///                              │                          └─▶ CastSuccess
///                              └─▶ CastSuccess   (instant spells)
/// ```
///
/// The graph is acyclic, so a cast that only follows it never revisits a stage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, strum::Display,
    strum::EnumString, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CastStage {
    /// Pre-construction sentinel. No live cast is ever in this stage.
    #[default]
    Null,
    Initialization,
    Targeting,
    TargetingFailed,
    PreCasting,
    Casting,
    CastFail,
    CastSuccess,
}

impl CastStage {
    /// Whether the transition graph has an edge `self -> next`.
    pub fn can_transition_to(self, next: CastStage) -> bool {
        use CastStage::*;
        matches!(
            (self, next),
            (Null, Initialization)
                | (Initialization, Targeting)
                | (Targeting, TargetingFailed)
                | (Targeting, PreCasting)
                | (Targeting, CastSuccess)
                | (PreCasting, Casting)
                | (PreCasting, CastFail)
                | (Casting, CastFail)
                | (Casting, CastSuccess)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CastStage::TargetingFailed | CastStage::CastFail | CastStage::CastSuccess
        )
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn terminal_stages_have_no_successors() {
        for stage in CastStage::iter().filter(|s| s.is_terminal()) {
            assert!(CastStage::iter().all(|next| !stage.can_transition_to(next)));
        }
    }

    #[test]
    fn no_stage_reaches_itself_or_goes_back_to_null() {
        for from in CastStage::iter() {
            assert!(!from.can_transition_to(from));
            assert!(!from.can_transition_to(CastStage::Null));
            assert!(!from.can_transition_to(CastStage::Initialization) || from == CastStage::Null);
        }
    }

    #[test]
    fn instant_spells_skip_the_wind_up() {
        assert!(CastStage::Targeting.can_transition_to(CastStage::CastSuccess));
        assert!(!CastStage::Targeting.can_transition_to(CastStage::Casting));
        assert!(!CastStage::Initialization.can_transition_to(CastStage::PreCasting));
    }
}
