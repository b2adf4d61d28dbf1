use lettre::message::{Mailbox, Message as Email};
use lettre::{SmtpTransport, Transport};
use smtpmock::{Configuration, Server};
use std::error::Error;
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn start_server(configuration: Configuration) -> (u16, mpsc::Receiver<smtpmock::Message>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    let server = Server::new(configuration);

    thread::spawn(move || {
        server
            .start_with_listener(listener, tx)
            .expect("server start failed")
    });

    (port, rx)
}

fn email(to: &str) -> Result<Email, Box<dyn Error>> {
    Ok(Email::builder()
        .from("Hanako <hanako@example.com>".parse::<Mailbox>()?)
        .to(to.parse::<Mailbox>()?)
        .subject("Greetings")
        .body("Hello from lettre".to_owned())?)
}

#[test]
fn basic_lettre_send() -> Result<(), Box<dyn Error>> {
    let (port, rx) = start_server(Configuration::default());

    let mailer = SmtpTransport::builder_dangerous("127.0.0.1")
        .port(port)
        .build();

    mailer.send(&email("Tarou <tarou@example.com>")?)?;

    let message = rx.recv_timeout(Duration::from_secs(1))?;
    assert!(message.is_consistent());
    assert_eq!(message.mailfrom_email.as_deref(), Some("hanako@example.com"));
    assert_eq!(message.rcptto_emails, vec!["tarou@example.com"]);
    assert_eq!(message.subject(), Some("Greetings"));
    assert!(message.body().contains("Hello from lettre"));

    Ok(())
}

#[test]
fn lettre_sees_rejection() -> Result<(), Box<dyn Error>> {
    let configuration = Configuration {
        not_registered_emails: ["nobody@example.com".to_owned()].into(),
        ..Default::default()
    };
    let (port, rx) = start_server(configuration);

    let mailer = SmtpTransport::builder_dangerous("127.0.0.1")
        .port(port)
        .build();

    let result = mailer.send(&email("nobody@example.com")?);
    assert!(result.is_err());

    let message = rx.recv_timeout(Duration::from_secs(1))?;
    assert!(!message.rcptto.successful);
    assert_eq!(message.rcptto.response, "550 User not found");

    Ok(())
}
