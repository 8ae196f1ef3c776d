//! Landmark index tables for the face and hand models.
//!
//! Indices follow the 478-point face mesh and the 21-point hand model.

// ============================================================================
// FACE
// ============================================================================

pub const FACE_LANDMARK_COUNT: usize = 478;

pub const FACE_UPPER_LIP_CENTER: usize = 0;
pub const FACE_NOSE_TIP: usize = 1;
pub const FACE_NOSE_BOTTOM: usize = 4;
pub const FACE_UPPER_LIP_INNER: usize = 13;
pub const FACE_LOWER_LIP_INNER: usize = 14;
pub const FACE_CHIN: usize = 152;
pub const FACE_FOREHEAD: usize = 10;
pub const FACE_LEFT_CHEEK: usize = 234;
pub const FACE_RIGHT_CHEEK: usize = 454;

/// Landmarks highlighted in overlay previews.
pub const FACE_KEY_POINTS: [usize; 8] = [
    FACE_NOSE_TIP,
    FACE_NOSE_BOTTOM,
    FACE_UPPER_LIP_INNER,
    FACE_LOWER_LIP_INNER,
    FACE_CHIN,
    FACE_FOREHEAD,
    FACE_LEFT_CHEEK,
    FACE_RIGHT_CHEEK,
];

// ============================================================================
// HAND
// ============================================================================

pub const HAND_LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Hand skeleton connections for rendering
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];
