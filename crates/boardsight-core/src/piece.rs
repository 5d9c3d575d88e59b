use serde::{Deserialize, Serialize};
use std::fmt;

/// Chess piece type, independent of color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

/// Kinds a strategic-piece specialist is trusted with by default.
pub const STRATEGIC_KINDS: [PieceKind; 4] = [
    PieceKind::King,
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
];

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ];

    /// Lowercase English name, as used in detector labels.
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
            PieceKind::Pawn => "pawn",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PieceKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Uppercase notation letter.
    fn letter(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn name(self) -> &'static str {
        match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        }
    }
}

/// One of the 12 canonical pieces `{K,Q,R,B,N,P,k,q,r,b,n,p}`.
///
/// Uppercase symbols are white, lowercase are black.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Piece {
    pub color: PieceColor,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: PieceColor, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Canonical notation symbol.
    pub fn symbol(self) -> char {
        let c = self.kind.letter();
        match self.color {
            PieceColor::White => c,
            PieceColor::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parse a canonical notation symbol. Case carries the color.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let kind = PieceKind::ALL
            .into_iter()
            .find(|k| k.letter() == symbol.to_ascii_uppercase())?;
        let color = if symbol.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        Some(Self { color, kind })
    }

    /// Display label in the `color-kind` form, e.g. `white-king`.
    pub fn label(self) -> String {
        format!("{}-{}", self.color.name(), self.kind.name())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Map a detector class label onto a canonical [`Piece`].
///
/// Accepted spellings:
/// - `white-king`, `black-king` (any case, with `-`, `_`, space or no
///   separator between color and kind),
/// - bare kind names (`king`, `Knight`), which map to white,
/// - a single canonical symbol (`K`, `n`).
///
/// Anything else returns `None`; callers treat that as a malformed detection.
pub fn normalize_label(label: &str) -> Option<Piece> {
    let trimmed = label.trim();

    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Piece::from_symbol(c);
    }

    let lowered: String = trimmed
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect();

    for color in [PieceColor::White, PieceColor::Black] {
        if let Some(rest) = lowered.strip_prefix(color.name()) {
            return PieceKind::from_name(rest).map(|kind| Piece::new(color, kind));
        }
    }

    PieceKind::from_name(&lowered).map(|kind| Piece::new(PieceColor::White, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_cover_the_canonical_alphabet() {
        let mut symbols: Vec<char> = [PieceColor::White, PieceColor::Black]
            .into_iter()
            .flat_map(|c| PieceKind::ALL.map(|k| Piece::new(c, k).symbol()))
            .collect();
        symbols.sort_unstable();
        let s: String = symbols.into_iter().collect();
        assert_eq!(s, "BKNPQRbknpqr");
    }

    #[test]
    fn from_symbol_inverts_symbol() {
        for symbol in "KQRBNPkqrbnp".chars() {
            let piece = Piece::from_symbol(symbol).expect("canonical symbol");
            assert_eq!(piece.symbol(), symbol);
        }
        assert!(Piece::from_symbol('x').is_none());
        assert!(Piece::from_symbol('1').is_none());
    }

    #[test]
    fn normalizes_colored_label_variants() {
        let black_queen = Some(Piece::new(PieceColor::Black, PieceKind::Queen));
        assert_eq!(normalize_label("black-queen"), black_queen);
        assert_eq!(normalize_label("black queen"), black_queen);
        assert_eq!(normalize_label("Black_Queen"), black_queen);
        assert_eq!(normalize_label("blackqueen"), black_queen);
        assert_eq!(normalize_label("  BLACK-QUEEN "), black_queen);
        assert_eq!(
            normalize_label("white-king"),
            Some(Piece::new(PieceColor::White, PieceKind::King))
        );
    }

    #[test]
    fn unqualified_kind_maps_to_white() {
        assert_eq!(
            normalize_label("knight"),
            Some(Piece::new(PieceColor::White, PieceKind::Knight))
        );
        assert_eq!(normalize_label("Pawn").map(Piece::symbol), Some('P'));
    }

    #[test]
    fn single_symbol_labels_keep_their_case() {
        assert_eq!(normalize_label("n").map(Piece::symbol), Some('n'));
        assert_eq!(normalize_label("R").map(Piece::symbol), Some('R'));
    }

    #[test]
    fn unknown_labels_are_rejected() {
        for label in ["", "board", "white", "red-king", "white-kingg", "kings", "x"] {
            assert!(normalize_label(label).is_none(), "{label:?} should not map");
        }
    }

    #[test]
    fn label_uses_color_kind_form() {
        let p = Piece::from_symbol('b').expect("symbol");
        assert_eq!(p.label(), "black-bishop");
        assert_eq!(p.to_string(), "b");
    }
}
