//! FLTK text buffer bridge.
//!
//! The editor widget owns a plain `TextBuffer` for the text and a parallel
//! style buffer (one style byte per text byte). User edits in the widget are
//! forwarded to the message channel in character offsets so the engine can
//! replay them on the document model.

use std::cell::Cell;
use std::ffi::{CStr, c_char, c_int, c_void};
use std::rc::Rc;

use fltk::app::Sender;
use fltk::text::TextBuffer;

use crate::app::domain::document::char_to_byte;
use crate::app::domain::messages::Message;

/// Read text from an FLTK TextBuffer without leaking the C-allocated copy.
///
/// fltk-rs's `TextBuffer::text()` copies the `malloc()`'d string returned by
/// `Fl_Text_Buffer_text()` but never frees it. The editor reads the buffer
/// after every edit, so this calls the FFI directly and frees the copy.
pub fn buffer_text_no_leak(buf: &TextBuffer) -> String {
    unsafe extern "C" {
        fn Fl_Text_Buffer_text(buf: *mut c_void) -> *mut c_char;
        fn free(ptr: *mut c_void);
    }

    // SAFETY: buf.as_ptr() is the live FLTK buffer. Fl_Text_Buffer_text
    // returns a malloc'd, null-terminated string (or null), which is copied
    // and then released with the matching free().
    unsafe {
        let inner = buf.as_ptr() as *mut c_void;
        let ptr = Fl_Text_Buffer_text(inner);
        if ptr.is_null() {
            return String::new();
        }
        let result = CStr::from_ptr(ptr).to_string_lossy().into_owned();
        free(ptr as *mut c_void);
        result
    }
}

/// The closure type stored behind the FFI `void* cbArg`.
type ModifyCb = dyn FnMut(i32, i32, i32, i32, *const c_char);

type ModifyFn = unsafe extern "C" fn(c_int, c_int, c_int, c_int, *const c_char, *mut c_void);

/// Fixed C callback handed to FLTK. Being a single function pointer lets
/// `Fl_Text_Buffer_remove_modify_callback` find it again on drop.
///
/// # Safety
///
/// `cb_arg` must be the `Box<ModifyCb>` pointer created in
/// `register_modify_callback`, which stays valid until `EditorBuffer` drops.
unsafe extern "C" fn modify_shim(
    pos: c_int,
    n_inserted: c_int,
    n_deleted: c_int,
    n_restyled: c_int,
    deleted_text: *const c_char,
    cb_arg: *mut c_void,
) {
    if cb_arg.is_null() {
        log::warn!("modify_shim called with null callback argument");
        return;
    }
    // SAFETY: non-null cb_arg points at the boxed closure owned by EditorBuffer.
    unsafe {
        let cb: &mut Box<ModifyCb> = &mut *(cb_arg as *mut Box<ModifyCb>);
        cb(pos, n_inserted, n_deleted, n_restyled, deleted_text);
    }
}

unsafe extern "C" {
    fn Fl_Text_Buffer_add_modify_callback(buf: *mut c_void, cb: Option<ModifyFn>, cb_arg: *mut c_void);
    fn Fl_Text_Buffer_remove_modify_callback(buf: *mut c_void, cb: Option<ModifyFn>, cb_arg: *mut c_void);
}

/// Characters in the text FLTK reports as deleted, falling back to the byte
/// count when the text is unavailable.
fn deleted_chars(deleted_text: *const c_char, deleted_bytes: i32) -> usize {
    if deleted_text.is_null() {
        return deleted_bytes.max(0) as usize;
    }
    // SAFETY: FLTK passes a null-terminated copy of the removed text.
    let text = unsafe { CStr::from_ptr(deleted_text) };
    text.to_string_lossy().chars().count()
}

fn register_modify_callback(
    buffer: &TextBuffer,
    style_buffer: &TextBuffer,
    suppress: &Rc<Cell<bool>>,
    sender: Sender<Message>,
) -> *mut c_void {
    let suppress = suppress.clone();
    let text_buf = buffer.clone();
    let mut style_buf = style_buffer.clone();

    let cb: Box<ModifyCb> = Box::new(
        move |pos: i32, inserted: i32, deleted: i32, _restyled: i32, deleted_text: *const c_char| {
            if inserted <= 0 && deleted <= 0 {
                return;
            }
            if deleted > 0 {
                style_buf.remove(pos, pos + deleted);
            }
            if inserted > 0 {
                style_buf.insert(pos, &"A".repeat(inserted as usize));
            }
            if suppress.get() {
                return;
            }
            let inserted_text = if inserted > 0 {
                text_buf.text_range(pos, pos + inserted).unwrap_or_default()
            } else {
                String::new()
            };
            sender.send(Message::BufferEdited {
                pos: text_buf.count_displayed_characters(0, pos).max(0) as usize,
                inserted: inserted_text,
                deleted: if deleted > 0 { deleted_chars(deleted_text, deleted) } else { 0 },
            });
        },
    );

    let data = Box::into_raw(Box::new(cb)) as *mut c_void;

    // SAFETY: `data` stays alive until EditorBuffer::drop removes the
    // callback and frees it.
    unsafe {
        Fl_Text_Buffer_add_modify_callback(buffer.as_ptr() as *mut c_void, Some(modify_shim), data);
    }

    data
}

/// Text and style buffers of the editor widget.
pub struct EditorBuffer {
    pub buffer: TextBuffer,
    pub style_buffer: TextBuffer,
    suppress: Rc<Cell<bool>>,
    /// Heap-allocated closure passed to FLTK's modify callback; freed on drop.
    modify_cb_data: *mut c_void,
}

impl EditorBuffer {
    pub fn new(sender: Sender<Message>) -> Self {
        let buffer = TextBuffer::default();
        let style_buffer = TextBuffer::default();
        let suppress = Rc::new(Cell::new(false));
        let modify_cb_data = register_modify_callback(&buffer, &style_buffer, &suppress, sender);
        Self {
            buffer,
            style_buffer,
            suppress,
            modify_cb_data,
        }
    }

    pub fn text(&self) -> String {
        buffer_text_no_leak(&self.buffer)
    }

    /// Replace the text without reporting it as a user edit.
    pub fn set_text_silently(&mut self, text: &str) {
        self.suppress.set(true);
        self.buffer.set_text(text);
        self.suppress.set(false);
    }

    /// Replace the style bytes. `styles` must be as long (in bytes) as the text.
    pub fn set_styles(&mut self, styles: &str) {
        self.style_buffer.set_text(styles);
    }

    /// Character offset of a byte position.
    pub fn char_offset(&self, byte_pos: i32) -> usize {
        self.buffer.count_displayed_characters(0, byte_pos).max(0) as usize
    }

    /// Byte position of a character offset.
    pub fn byte_offset(&self, char_offset: usize) -> i32 {
        char_to_byte(&self.text(), char_offset) as i32
    }

    /// Current selection as `(anchor, focus)` character offsets. The focus is
    /// the end holding the cursor; without a selection both are the cursor.
    pub fn selection_chars(&self, insert_pos: i32) -> (usize, usize) {
        let caret = self.char_offset(insert_pos);
        match self.buffer.selection_position() {
            Some((start, end)) if start != end => {
                let (start, end) = (self.char_offset(start), self.char_offset(end));
                if caret == start { (end, start) } else { (start, end) }
            }
            _ => (caret, caret),
        }
    }

    /// Select the character range `anchor..focus` (in either order).
    pub fn select_chars(&mut self, anchor: usize, focus: usize) {
        let (start, end) = (anchor.min(focus), anchor.max(focus));
        if start == end {
            self.buffer.unselect();
        } else {
            let (start, end) = (self.byte_offset(start), self.byte_offset(end));
            self.buffer.select(start, end);
        }
    }
}

impl Drop for EditorBuffer {
    fn drop(&mut self) {
        if self.modify_cb_data.is_null() {
            return;
        }
        // SAFETY: remove the exact (shim, data) pair registered in new(),
        // then reclaim the box so nothing can call into it again.
        unsafe {
            Fl_Text_Buffer_remove_modify_callback(
                self.buffer.as_ptr() as *mut c_void,
                Some(modify_shim),
                self.modify_cb_data,
            );
            drop(Box::from_raw(self.modify_cb_data as *mut Box<ModifyCb>));
        }
        self.modify_cb_data = std::ptr::null_mut();
    }
}
