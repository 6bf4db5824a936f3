/// UV rectangle `(u0, v0, u1, v1)` of a cell on a `columns` x `rows` sheet.
/// `v` grows downward, so `v0` is the top edge.
pub fn sheet_cell_uv(index: u32, columns: u32, rows: u32) -> (f32, f32, f32, f32) {
    let columns = columns.max(1);
    let rows = rows.max(1);
    let cell_width = 1.0 / columns as f32;
    let cell_height = 1.0 / rows as f32;
    let u0 = (index % columns) as f32 * cell_width;
    let v0 = (index / columns) as f32 * cell_height;
    (u0, v0, u0 + cell_width, v0 + cell_height)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Appends a rectangle as two triangles.
    pub fn push_rect(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        uv: (f32, f32, f32, f32),
    ) {
        let (u0, v0, u1, v1) = uv;
        self.positions.extend_from_slice(&[
            [left, top],
            [left, bottom],
            [right, top],
            [right, top],
            [left, bottom],
            [right, bottom],
        ]);
        self.uvs.extend_from_slice(&[
            [u0, v0],
            [u0, v1],
            [u1, v0],
            [u1, v0],
            [u0, v1],
            [u1, v1],
        ]);
    }
}

/// Unit quad centred on the origin showing one sheet cell.
pub fn sprite_quad(cell: u32, columns: u32, rows: u32) -> Mesh {
    let mut mesh = Mesh::default();
    mesh.push_rect(-0.5, 0.5, 0.5, -0.5, sheet_cell_uv(cell, columns, rows));
    mesh
}

/// Axis-aligned rectangle showing a whole texture.
pub fn textured_rect(half_width: f32, half_height: f32) -> Mesh {
    let mut mesh = Mesh::default();
    mesh.push_rect(
        -half_width,
        half_height,
        half_width,
        -half_height,
        (0.0, 0.0, 1.0, 1.0),
    );
    mesh
}

/// Lays out a line of text from a square glyph bank indexed by byte value.
/// Glyph `i` is centred at `x = i * (font_size + spacing)`, `y = 0`.
pub fn text_mesh(text: &str, font_size: f32, spacing: f32, bank_size: u32) -> Mesh {
    let mut mesh = Mesh::default();
    let half = font_size * 0.5;
    for (i, byte) in text.bytes().enumerate() {
        let offset = (font_size + spacing) * i as f32;
        mesh.push_rect(
            offset - half,
            half,
            offset + half,
            -half,
            sheet_cell_uv(u32::from(byte), bank_size, bank_size),
        );
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_cell_uv_indexes_row_major() {
        assert_eq!(sheet_cell_uv(0, 4, 4), (0.0, 0.0, 0.25, 0.25));
        assert_eq!(sheet_cell_uv(6, 4, 4), (0.5, 0.25, 0.75, 0.5));
    }

    #[test]
    fn sprite_quad_is_unit_sized() {
        let quad = sprite_quad(3, 2, 2);
        assert_eq!(quad.vertex_count(), 6);
        assert_eq!(quad.positions[0], [-0.5, 0.5]);
        assert_eq!(quad.positions[5], [0.5, -0.5]);
        assert_eq!(quad.uvs[5], [1.0, 1.0]);
    }

    #[test]
    fn text_mesh_advances_by_size_plus_spacing() {
        let mesh = text_mesh("AB", 1.0, 0.5, 16);
        assert_eq!(mesh.vertex_count(), 12);
        // second glyph's top-left corner
        assert_eq!(mesh.positions[6], [1.0, 0.5]);
        // 'A' is 65: column 1, row 4 on a 16x16 bank
        assert_eq!(mesh.uvs[0], [1.0 / 16.0, 4.0 / 16.0]);
    }
}
