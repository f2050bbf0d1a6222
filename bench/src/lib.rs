//! Synthetic page generator shared by the benchmarks.

use image::{Rgb, RgbImage};

const PAPER: Rgb<u8> = Rgb([245, 243, 238]);
const INK: Rgb<u8> = Rgb([20, 20, 24]);

/// A page of `columns` text columns with a ruled table across the middle,
/// scaled to the page size so larger pages carry proportionally more ink.
pub fn synthetic_page(width: u32, height: u32, columns: u32) -> RgbImage {
    let mut page = RgbImage::from_pixel(width, height, PAPER);
    let columns = columns.max(1);
    let margin = width / 20;
    let gutter = width / 30;
    let col_width = (width - 2 * margin - (columns - 1) * gutter) / columns;

    let table_top = height * 2 / 5;
    let table_bottom = height * 3 / 5;

    for c in 0..columns {
        let x0 = margin + c * (col_width + gutter);
        let x1 = x0 + col_width;
        let mut y = height / 20;
        while y + 8 < height - height / 20 {
            if y + 8 >= table_top && y < table_bottom {
                y = table_bottom + 20;
                continue;
            }
            text_line(&mut page, x0, x1, y);
            // A blank line every sixth line separates paragraphs.
            y += if (y / 14) % 6 == 5 { 42 } else { 14 };
        }
    }

    ruled_table(&mut page, margin, table_top, width - margin, table_bottom);
    page
}

fn text_line(page: &mut RgbImage, x0: u32, x1: u32, top: u32) {
    let mut x = x0;
    let mut letter = 0;
    while x + 6 <= x1 {
        fill(page, x, top, x + 6, top + 8);
        letter += 1;
        x += if letter % 5 == 0 { 14 } else { 9 };
    }
}

fn ruled_table(page: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) {
    let rows = 4;
    let cols = 3;
    for r in 0..=rows {
        let y = (y0 + (y1 - y0 - 2) * r / rows).min(y1 - 2);
        fill(page, x0, y, x1, y + 2);
    }
    for c in 0..=cols {
        let x = (x0 + (x1 - x0 - 2) * c / cols).min(x1 - 2);
        fill(page, x, y0, x + 2, y1);
    }
}

fn fill(page: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) {
    let x1 = x1.min(page.width());
    let y1 = y1.min(page.height());
    for y in y0..y1 {
        for x in x0..x1 {
            page.put_pixel(x, y, INK);
        }
    }
}
