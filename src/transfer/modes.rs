//! FTP transfer parameters
//!
//! Representation type, transfer mode and file structure negotiation for the
//! TYPE, MODE and STRU commands.

/// Result of negotiating a transfer parameter with the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation<T> {
    Accepted(T),
    /// A valid code this server does not implement.
    Unimplemented,
    Invalid,
}

/// Representation type selected with TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepresentationType {
    Ascii,
    #[default]
    Image,
}

impl RepresentationType {
    pub fn negotiate(code: &str) -> Negotiation<Self> {
        match code.to_ascii_uppercase().as_str() {
            "A" => Negotiation::Accepted(RepresentationType::Ascii),
            "I" => Negotiation::Accepted(RepresentationType::Image),
            "E" | "L" => Negotiation::Unimplemented,
            _ => Negotiation::Invalid,
        }
    }
}

/// Transfer mode selected with MODE. Only stream mode exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Stream,
}

impl TransferMode {
    pub fn negotiate(code: &str) -> Negotiation<Self> {
        match code.to_ascii_uppercase().as_str() {
            "S" => Negotiation::Accepted(TransferMode::Stream),
            "B" | "C" => Negotiation::Unimplemented,
            _ => Negotiation::Invalid,
        }
    }
}

/// File structure selected with STRU. Only file structure exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStructure {
    #[default]
    File,
}

impl FileStructure {
    pub fn negotiate(code: &str) -> Negotiation<Self> {
        match code.to_ascii_uppercase().as_str() {
            "F" => Negotiation::Accepted(FileStructure::File),
            "R" | "P" => Negotiation::Unimplemented,
            _ => Negotiation::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(
            RepresentationType::negotiate("A"),
            Negotiation::Accepted(RepresentationType::Ascii)
        );
        assert_eq!(
            RepresentationType::negotiate("i"),
            Negotiation::Accepted(RepresentationType::Image)
        );
        assert_eq!(RepresentationType::negotiate("E"), Negotiation::Unimplemented);
        assert_eq!(RepresentationType::negotiate("l"), Negotiation::Unimplemented);
        assert_eq!(RepresentationType::negotiate("X"), Negotiation::Invalid);
        assert_eq!(RepresentationType::negotiate("AI"), Negotiation::Invalid);
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(
            TransferMode::negotiate("s"),
            Negotiation::Accepted(TransferMode::Stream)
        );
        assert_eq!(TransferMode::negotiate("B"), Negotiation::Unimplemented);
        assert_eq!(TransferMode::negotiate("C"), Negotiation::Unimplemented);
        assert_eq!(TransferMode::negotiate("Z"), Negotiation::Invalid);
    }

    #[test]
    fn test_structure_codes() {
        assert_eq!(
            FileStructure::negotiate("F"),
            Negotiation::Accepted(FileStructure::File)
        );
        assert_eq!(FileStructure::negotiate("r"), Negotiation::Unimplemented);
        assert_eq!(FileStructure::negotiate("P"), Negotiation::Unimplemented);
        assert_eq!(FileStructure::negotiate(""), Negotiation::Invalid);
    }

    #[test]
    fn test_default_representation_is_image() {
        assert_eq!(RepresentationType::default(), RepresentationType::Image);
    }
}
