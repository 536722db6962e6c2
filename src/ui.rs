/*! The immediate-mode UI library, seen from the renderer's side.

The renderer does not link a particular UI library.  Instead the host implements [UiContext]
over whatever library it uses, and converts that library's per-frame output into a [DrawData].
*/

mod context;
mod draw_data;

pub use context::{DisplayMetrics, FontAtlas, UiContext};
pub use draw_data::{DrawCmd, DrawData, DrawList, DrawVert};
