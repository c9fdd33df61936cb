use std::collections::VecDeque;
use std::{io, time::Duration};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};
use tokio::time::interval;

use ephemera_client::RemoteStore;
use ephemera_common::{DEFAULT_HOST, DEFAULT_PORT};
use ephemera_storage::StateBackend;

const WINDOW: usize = 120;

#[derive(Parser, Debug)]
#[command(name = "ephemera-monitor", about = "Monitor TUI do Ephemera")]
struct Args {
    #[arg(long, env = "EPHEMERA_HOST", default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, env = "EPHEMERA_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
}

/// Série de estados vivos + último status do servidor.
struct App {
    samples: VecDeque<(f64, f64)>,
    tick: f64,
    ttl: Duration,
    status: String,
}

impl App {
    fn new(ttl: Duration) -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW),
            tick: 0.0,
            ttl,
            status: "ok".into(),
        }
    }

    fn record(&mut self, live: usize) {
        self.tick += 1.0;
        if self.samples.len() >= WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back((self.tick, live as f64));
        self.status = "ok".into();
    }

    fn peak(&self) -> f64 {
        self.samples.iter().map(|(_, y)| *y).fold(0.0, f64::max)
    }

    fn current(&self) -> usize {
        self.samples.back().map(|(_, y)| *y as usize).unwrap_or(0)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let remote = RemoteStore::connect(addr.as_str()).await?;
    let mut app = App::new(remote.ttl().await?);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut ticker = interval(Duration::from_secs(1));

    loop {
        terminal.draw(|f| ui(f, &app, &addr))?;

        if event::poll(Duration::from_millis(0))?
            && let Event::Key(key) = event::read()?
            && key.code == KeyCode::Char('q')
        {
            break;
        }

        ticker.tick().await;
        match remote.count().await {
            Ok(live) => app.record(live),
            // RemoteStore reconecta sozinho no próximo tick
            Err(e) => app.status = format!("erro: {e}"),
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App, addr: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.size());

    let header = Paragraph::new(format!(
        "{addr} | vivos: {} | pico: {:.0} | ttl: {}s | {} | q para sair",
        app.current(),
        app.peak(),
        app.ttl.as_secs(),
        app.status
    ))
    .block(Block::default().borders(Borders::ALL).title("Ephemera"))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, chunks[0]);

    let points: Vec<(f64, f64)> = app.samples.iter().copied().collect();
    let datasets = vec![
        Dataset::default()
            .name("vivos")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Yellow))
            .graph_type(GraphType::Line)
            .data(&points),
    ];

    let x_min = app.tick - WINDOW as f64;
    let max_y = app.peak() + 10.0;

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title("Estados vivos")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("t (s)")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, app.tick])
                .labels(vec![
                    Span::raw(format!("{x_min:.0}")),
                    Span::raw(format!("{:.0}", app.tick)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("estados")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_y])
                .labels(vec![
                    Span::raw("0"),
                    Span::styled(
                        format!("{max_y:.0}"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
        );

    f.render_widget(chart, chunks[1]);
}
