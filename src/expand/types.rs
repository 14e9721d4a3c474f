use thiserror::Error;

/// Garde-fou : au-delà, la fenêtre est très probablement mal bornée et le
/// déploiement entier est refusé plutôt que de produire un calendrier
/// démesuré.
pub const MAX_OCCURRENCES_PER_ITEM: usize = 1000;

/// Échecs de déploiement, toujours rattachés à un élément. Le moteur
/// refuse tout le document : jamais de calendrier partiel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("items[{item}]: recurrence window has no usable bound (startOn/endOn, until or term bounds)")]
    UnboundedWindow { item: usize },
    #[error("items[{item}]: more than {max} occurrences, window is probably misconfigured")]
    TooManyOccurrences { item: usize, max: usize },
    #[error("items[{item}]: date arithmetic out of range")]
    DateOutOfRange { item: usize },
    #[error("items[{item}]: no base time window resolvable")]
    MissingTimes { item: usize },
}
