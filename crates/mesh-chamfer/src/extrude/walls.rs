//! Wall quad emission between stacked perimeter rings.

/// Emit the triangles connecting two rings of equal length.
///
/// `top_start` and `bottom_start` are the base indices of the rings in the
/// output vertex buffer. With the top ring counter-clockwise around the
/// outward face normal and the bottom ring directly below it, the two
/// triangles per edge wind outward.
pub(crate) fn band_faces(top_start: u32, bottom_start: u32, ring_len: u32) -> Vec<[u32; 3]> {
    let mut faces = Vec::with_capacity(2 * ring_len as usize);
    for i in 0..ring_len {
        let j = (i + 1) % ring_len;
        let top_i = top_start + i;
        let top_j = top_start + j;
        let bottom_i = bottom_start + i;
        let bottom_j = bottom_start + j;
        faces.push([top_i, bottom_i, bottom_j]);
        faces.push([top_i, bottom_j, top_j]);
    }
    faces
}
