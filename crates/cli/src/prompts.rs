use std::io::{self, IsTerminal, Write};

/// Wait for Enter so a failure stays visible before the window closes.
///
/// Does nothing when not attached to a terminal.
pub fn pause() -> io::Result<()> {
  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    return Ok(());
  }

  write!(io::stderr(), "Press Enter to continue...")?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;
  Ok(())
}
