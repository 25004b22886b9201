//! Converting raw x11rb events into our backend agnostic [XEvent] type.
use crate::{
    core::bindings::{KeyCode, ModMask, MouseButton},
    pure::geometry::Rect,
    x::{
        event::{
            ButtonEvent, ClientMessage, ConfigureEvent, ConfigureMask, ConfigureRequest,
            MotionEvent, PropertyEvent, XEvent,
        },
        XConn,
    },
    x11rb::X11rbConnection,
    Result, Xid,
};
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{
            ButtonPressEvent, ConfigWindow, NotifyDetail, NotifyMode, Property,
            CONFIGURE_WINDOW_REQUEST, COPY_AREA_REQUEST, GRAB_BUTTON_REQUEST, GRAB_KEY_REQUEST,
            IMAGE_TEXT8_REQUEST, POLY_FILL_RECTANGLE_REQUEST, POLY_SEGMENT_REQUEST,
            POLY_TEXT8_REQUEST, SET_INPUT_FOCUS_REQUEST,
        },
        ErrorKind, Event,
    },
    x11_utils::X11Error,
};

// Events sent by other clients have the top bit of response_type set.
const SEND_EVENT_BIT: u8 = 0x80;

pub(crate) fn convert_event<C: Connection>(
    conn: &X11rbConnection<C>,
    event: Event,
) -> Result<Option<XEvent>> {
    match event {
        Event::ButtonPress(event) => Ok(to_button_event(&event).map(XEvent::ButtonPress)),
        Event::ButtonRelease(event) => Ok(to_button_event(&event).map(XEvent::ButtonRelease)),

        Event::MotionNotify(event) => Ok(Some(XEvent::Motion(MotionEvent {
            win: Xid(event.event),
            x_root: event.root_x as i32,
            y_root: event.root_y as i32,
            time: event.time,
        }))),

        Event::KeyPress(event) => Ok(Some(XEvent::KeyPress(KeyCode {
            mask: ModMask::from_bits_truncate(u16::from(event.state)),
            code: event.detail,
        }))),

        Event::MappingNotify(_) => Ok(Some(XEvent::MappingNotify)),

        Event::MapRequest(event) => Ok(Some(XEvent::MapRequest(Xid(event.window)))),

        // Only forward enters that are a real crossing onto the window (or
        // anything landing on the root): grab transitions and crossings
        // between a window and its own children just churn focus.
        Event::EnterNotify(event) => {
            let real_crossing =
                event.mode == NotifyMode::NORMAL && event.detail != NotifyDetail::INFERIOR;
            if real_crossing || Xid(event.event) == conn.root() {
                Ok(Some(XEvent::Enter(Xid(event.event))))
            } else {
                Ok(None)
            }
        }

        Event::DestroyNotify(event) => Ok(Some(XEvent::Destroy(Xid(event.window)))),

        Event::ConfigureNotify(event) => Ok(Some(XEvent::ConfigureNotify(ConfigureEvent {
            win: Xid(event.window),
            rect: Rect::new(
                event.x as i32,
                event.y as i32,
                event.width as u32,
                event.height as u32,
            ),
        }))),

        Event::ConfigureRequest(event) => {
            let mut mask = ConfigureMask::empty();
            for (bit, flag) in [
                (ConfigWindow::X, ConfigureMask::X),
                (ConfigWindow::Y, ConfigureMask::Y),
                (ConfigWindow::WIDTH, ConfigureMask::WIDTH),
                (ConfigWindow::HEIGHT, ConfigureMask::HEIGHT),
                (ConfigWindow::BORDER_WIDTH, ConfigureMask::BORDER_WIDTH),
            ] {
                if event.value_mask.contains(bit) {
                    mask |= flag;
                }
            }

            Ok(Some(XEvent::ConfigureRequest(ConfigureRequest {
                win: Xid(event.window),
                x: event.x as i32,
                y: event.y as i32,
                w: event.width as u32,
                h: event.height as u32,
                border_width: event.border_width as u32,
                mask,
            })))
        }

        Event::Expose(event) if event.count == 0 => Ok(Some(XEvent::Expose(Xid(event.window)))),
        Event::Expose(_) => Ok(None),

        Event::FocusIn(event) => Ok(Some(XEvent::FocusIn(Xid(event.event)))),

        Event::ClientMessage(event) => {
            if event.format != 32 {
                warn!(format = event.format, "dropping client message");
                return Ok(None);
            }

            Ok(Some(XEvent::ClientMessage(ClientMessage {
                win: Xid(event.window),
                atom: conn.atom_name(event.type_)?,
                data: event.data.as_data32(),
            })))
        }

        Event::PropertyNotify(event) => Ok(Some(XEvent::PropertyNotify(PropertyEvent {
            win: Xid(event.window),
            atom: conn.atom_name(event.atom)?,
            is_delete: event.state == Property::DELETE,
        }))),

        Event::UnmapNotify(event) => Ok(Some(XEvent::UnmapNotify {
            win: Xid(event.window),
            from_send_event: event.response_type & SEND_EVENT_BIT != 0,
        })),

        Event::RandrScreenChangeNotify(_) | Event::RandrNotify(_) => {
            Ok(Some(XEvent::ScreenChange))
        }

        Event::Error(err) => {
            log_x_error(&err);
            Ok(None)
        }

        // NOTE: Ignoring other event types
        _ => Ok(None),
    }
}

fn to_button_event(event: &ButtonPressEvent) -> Option<ButtonEvent> {
    let button = match MouseButton::from_detail(event.detail) {
        Some(b) => b,
        None => {
            warn!(button = event.detail, "dropping unknown mouse button event");
            return None;
        }
    };

    Some(ButtonEvent {
        win: Xid(event.event),
        button,
        mask: ModMask::from_bits_truncate(u16::from(event.state)),
        x: event.event_x as i32,
        y: event.event_y as i32,
        x_root: event.root_x as i32,
        y_root: event.root_y as i32,
    })
}

/// X errors that show up in normal operation as clients come and go.
///
/// Requests against windows that vanished mid flight fail with errors that
/// do not indicate anything wrong on our side.
fn is_benign(err: &X11Error) -> bool {
    if err.error_kind == ErrorKind::Window {
        return true;
    }

    matches!(
        (err.major_opcode, err.error_kind),
        (SET_INPUT_FOCUS_REQUEST, ErrorKind::Match)
            | (POLY_TEXT8_REQUEST, ErrorKind::Drawable)
            | (POLY_FILL_RECTANGLE_REQUEST, ErrorKind::Drawable)
            | (POLY_SEGMENT_REQUEST, ErrorKind::Drawable)
            | (IMAGE_TEXT8_REQUEST, ErrorKind::Drawable)
            | (CONFIGURE_WINDOW_REQUEST, ErrorKind::Match)
            | (GRAB_BUTTON_REQUEST, ErrorKind::Access)
            | (GRAB_KEY_REQUEST, ErrorKind::Access)
            | (COPY_AREA_REQUEST, ErrorKind::Drawable)
    )
}

fn log_x_error(err: &X11Error) {
    if is_benign(err) {
        trace!(?err, "ignoring benign X error");
    } else {
        error!(?err, "unexpected X error");
    }
}
