//! Serial login demonstration.
//!
//! Re-creates the firmware's interactive login session on the host: the
//! driver runs against a simulated USART, scripted keystrokes stand in for
//! the operator, and the wire transcript is printed after each session.
//!
//! The session logic is a pure client of the driver's foreground API —
//! prompts go out through blocking writes, input comes back through
//! poll-and-drain, exactly as on the board.

use std::fmt;

use anyhow::Result;
use muon_core::log::Level;
use muon_core::uinfo;
use muon_sim::SimUsart;
use muon_usart::SerialPort;

/// Simulated board clock.
const CLOCK_HZ: u32 = 16_000_000;
/// Line speed the sessions run at.
const BAUD: u32 = 9_600;
/// PIN length, fixed by the card system.
const PIN_LEN: usize = 4;
/// Wrong PINs tolerated before the card is retained.
const MAX_PIN_ATTEMPTS: usize = 3;

/// The login workflow's external collaborator: a fixed user directory
/// offering lookup-by-name and PIN verification.
struct Directory {
    users: &'static [User],
}

struct User {
    name: &'static str,
    pin: &'static str,
}

impl Directory {
    /// Finds a user by exact full-name match.
    fn lookup(&self, name: &str) -> Option<usize> {
        self.users.iter().position(|user| user.name == name)
    }

    /// Checks `pin` against the stored PIN of user `id`.
    fn verify_pin(&self, id: usize, pin: &str) -> bool {
        self.users[id].pin == pin
    }
}

const DIRECTORY: Directory = Directory {
    users: &[
        User { name: "Alice Carter", pin: "4921" },
        User { name: "Hector Reyes", pin: "8806" },
        User { name: "Mina Kovac", pin: "3175" },
        User { name: "Dario Lang", pin: "6640" },
        User { name: "Sofia Brandt", pin: "1029" },
    ],
};

/// How a login session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Name matched and a PIN attempt verified.
    Success,
    /// Name matched but every attempt failed; the card stays in the slot.
    CardRetained,
    /// No such name in the directory.
    UnknownUser,
}

/// A configured port plus the test-side view of the wire.
struct Terminal {
    wire: SimUsart,
    port: SerialPort<SimUsart, 64>,
}

impl Terminal {
    fn new() -> Result<Self> {
        let wire = SimUsart::new(CLOCK_HZ);
        let port = SerialPort::new(wire.clone());
        // SAFETY: One-time setup, before any other use; the registers are
        // simulated, so there is no hardware to race with.
        unsafe { port.configure(BAUD)? };
        Ok(Self { wire, port })
    }

    /// The operator "types": each byte lands in the receive data register
    /// and the receive interrupt fires once, as on hardware.
    fn type_text(&self, text: &str) {
        for byte in text.bytes() {
            self.wire.inject(byte);
            self.port.handle_rx_interrupt();
        }
    }
}

/// Runs one login session with scripted operator input.
fn run_session(term: &Terminal, dir: &Directory, name: &str, pins: &[&str]) -> Outcome {
    let port = &term.port;

    port.write_str("Enter your name: ");
    term.type_text(name);
    while port.available() == 0 {
        std::hint::spin_loop();
    }
    let mut buf = [0u8; 32];
    let len = port.drain(&mut buf);
    let entered = String::from_utf8_lossy(&buf[..len]).into_owned();
    port.write_str(&entered);
    port.write_str("\r\n");

    let Some(id) = dir.lookup(&entered) else {
        port.write_str("Unknown user!\r\n\n");
        return Outcome::UnknownUser;
    };

    let mut attempts = 0;
    for pin in pins {
        port.write_str("Enter your PIN: ");
        term.type_text(pin);

        let mut entered_pin = String::new();
        for _ in 0..PIN_LEN {
            let byte = loop {
                if let Some(byte) = port.try_read_byte() {
                    break byte;
                }
                std::hint::spin_loop();
            };
            entered_pin.push(char::from(byte));
            // Echo a mask instead of the digit.
            port.write_byte(b'*');
        }
        port.write_str("\r\n");

        if dir.verify_pin(id, &entered_pin) {
            port.write_str("PIN accepted.\r\n\n");
            return Outcome::Success;
        }
        port.write_str("Wrong PIN!\r\n\n");
        attempts += 1;
        if attempts == MAX_PIN_ATTEMPTS {
            break;
        }
    }
    port.write_str("Card retained!\r\n\n");
    Outcome::CardRetained
}

fn stdout_sink(level: Option<Level>, args: fmt::Arguments<'_>) {
    match level {
        Some(level) => println!("[{}] {args}", level.name()),
        None => print!("{args}"),
    }
}

fn main() -> Result<()> {
    // SAFETY: Printing to stdout is fine from anywhere this demo logs.
    unsafe { muon_core::log::set_sink(stdout_sink) };
    muon_core::log::set_max_level(Level::Info);

    let scenarios: &[(&str, &[&str])] = &[
        ("Alice Carter", &["4921"]),
        ("Hector Reyes", &["0000", "1111", "2222"]),
        ("Nobody Known", &[]),
    ];

    for (name, pins) in scenarios {
        let term = Terminal::new()?;
        let outcome = run_session(&term, &DIRECTORY, name, pins);
        uinfo!("session for {name:?} finished: {outcome:?}");
        println!("--- wire transcript ({name}) ---");
        println!("{}", String::from_utf8_lossy(&term.wire.take_transmitted()));
    }
    Ok(())
}
