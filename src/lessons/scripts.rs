//! Entry scripts for the lesson scenarios
//!
//! Each function is the "main script" of one snippet: it runs synchronously
//! and registers timers and promise continuations on the loop.

use crate::error::{Error, Result};
use crate::event_loop::EventLoop;
use crate::runtime::{run_async, Async, Promise, Value};

/// A callback that prints one line
fn say(line: &'static str) -> impl FnOnce(&mut EventLoop) -> Result<()> {
    move |el| {
        el.log(line);
        Ok(())
    }
}

pub(super) fn coffee(el: &mut EventLoop) -> Result<()> {
    el.log("Preparing...");
    el.schedule_macrotask(say("Your coffee is ready ☕"), 2000);
    el.log("Please wait while we brew your coffee...");
    Ok(())
}

pub(super) fn two_timers(el: &mut EventLoop) -> Result<()> {
    el.log("Start");
    el.schedule_macrotask(say("Timer 1"), 0);
    el.schedule_macrotask(say("Timer 2"), 0);
    el.log("End");
    Ok(())
}

pub(super) fn microtask_vs_macrotask(el: &mut EventLoop) -> Result<()> {
    el.log("Start");
    el.schedule_macrotask(say("⏱️ setTimeout callback (Macrotask)"), 0);

    let order = Promise::new(el, |el, resolvers| {
        el.log("Brewing coffee...");
        resolvers.resolve(el, "☕ Coffee ready!");
        Ok(())
    });
    order.then(el, |el, message| {
        el.log(format!("🧩 Promise callback (Microtask): {}", message));
        Ok(Value::Undefined)
    });

    el.log("End");
    Ok(())
}

pub(super) fn mixed_delays(el: &mut EventLoop) -> Result<()> {
    el.schedule_macrotask(say("Slow timer done (2000ms)"), 2000);
    el.schedule_macrotask(say("Fast timer done (1000ms)"), 1000);
    el.log("Both timers scheduled");
    Ok(())
}

fn call_missing(name: &str) -> Result<Value> {
    Err(Error::reference_error(format!("{} is not defined", name)))
}

pub(super) fn try_catch(el: &mut EventLoop) -> Result<()> {
    el.log("Calling a function that does not exist...");
    match call_missing("nonExistentFunction") {
        Ok(_) => el.log("This line never runs"),
        Err(err) => el.log(format!("Error caught: {}", err.message())),
    }
    el.log("The program keeps running after the catch block");
    Ok(())
}

fn check_age(age: u32) -> Result<()> {
    if age < 18 {
        return Err(Error::range_error(format!(
            "Age {} is under 18, access denied",
            age
        )));
    }
    Ok(())
}

pub(super) fn throw_custom(el: &mut EventLoop) -> Result<()> {
    for age in [21, 15] {
        match check_age(age) {
            Ok(()) => el.log(format!("Age {}: access granted ✅", age)),
            Err(err) => el.log(format!("{} caught: {}", err.name(), err.message())),
        }
    }
    Ok(())
}

fn brew_with(water_ml: u32) -> Result<String> {
    if water_ml == 0 {
        return Err(Error::new("No water in the tank"));
    }
    Ok(format!("{}ml of coffee", water_ml))
}

fn brew_and_serve(el: &mut EventLoop, water_ml: u32) -> Result<()> {
    let coffee = brew_with(water_ml)?;
    el.log(format!("Brewed {}", coffee));
    Ok(())
}

/// `try { body } finally { cleanup }`: cleanup runs whether `body` returns
/// normally or bails out early, and the body's outcome is passed on
fn with_finally<T>(
    el: &mut EventLoop,
    body: impl FnOnce(&mut EventLoop) -> Result<T>,
    cleanup: impl FnOnce(&mut EventLoop),
) -> Result<T> {
    let outcome = body(el);
    cleanup(el);
    outcome
}

fn switch_off(el: &mut EventLoop) {
    el.log("finally: switching the machine off 🔌");
}

pub(super) fn finally(el: &mut EventLoop) -> Result<()> {
    for water_ml in [250, 0] {
        with_finally(
            el,
            |el| {
                if let Err(err) = brew_and_serve(el, water_ml) {
                    el.log(format!("Brewing failed: {}", err.message()));
                }
                Ok(())
            },
            switch_off,
        )?;
    }
    Ok(())
}

pub(super) fn promise_chain(el: &mut EventLoop) -> Result<()> {
    el.log("Placing the order...");

    let beans = Promise::resolved(el, "beans");
    beans
        .then(el, |el, beans| {
            el.log(format!("Grinding {}", beans));
            Ok(Value::from("ground coffee"))
        })
        .then(el, |el, ground| {
            el.log(format!("Brewing {}", ground));
            Err(Error::new("The milk has gone sour 🥛"))
        })
        .then(el, |el, _| {
            el.log("Serving the latte");
            Ok(Value::Undefined)
        })
        .catch(el, |el, err| {
            el.log(format!("Caught in chain: {}", err.message()));
            Ok(Value::from("black coffee"))
        })
        .finally(el, |el| {
            el.log("Order closed");
            Ok(())
        });

    el.log("Order placed, waiting...");
    Ok(())
}

/// A promise that fulfills after `delay_ms` of virtual time
fn brew(el: &mut EventLoop, delay_ms: i64) -> Promise {
    Promise::new(el, move |el, resolvers| {
        el.schedule_macrotask(
            move |el| {
                resolvers.resolve(el, "Hot coffee ☕");
                Ok(())
            },
            delay_ms,
        );
        Ok(())
    })
}

fn make_coffee(el: &mut EventLoop) -> Promise {
    run_async(el, |el| {
        el.log("makeCoffee(): started brewing");
        let brewing = brew(el, 1000);
        Async::await_then(brewing, |el, settled| {
            let coffee = settled?;
            el.log(format!("makeCoffee(): {} is served", coffee));
            Async::ret(coffee)
        })
    })
}

pub(super) fn async_await(el: &mut EventLoop) -> Result<()> {
    el.log("Before calling makeCoffee()");
    make_coffee(el);
    el.log("After calling makeCoffee(), nothing is blocked");
    Ok(())
}

fn broken_machine(el: &mut EventLoop) -> Promise {
    Promise::new(el, |el, resolvers| {
        el.schedule_macrotask(
            move |el| {
                resolvers.reject(el, Error::new("The coffee machine is broken 💥"));
                Ok(())
            },
            500,
        );
        Ok(())
    })
}

pub(super) fn async_error(el: &mut EventLoop) -> Result<()> {
    run_async(el, |el| {
        el.log("Trying to brew...");
        let attempt = broken_machine(el);
        Async::await_then(attempt, |el, settled| {
            match settled {
                Ok(coffee) => el.log(format!("Enjoy your {}", coffee)),
                Err(err) => el.log(format!("Caught async error: {}", err.message())),
            }
            Async::ret(())
        })
    });
    el.log("Waiting for the machine...");
    Ok(())
}

pub(super) fn isolated_failure(el: &mut EventLoop) -> Result<()> {
    el.schedule_macrotask(
        |el| {
            el.log("Timer 1 starts");
            Err(Error::type_error(
                "Cannot read properties of undefined (reading 'cup')",
            ))
        },
        0,
    );
    el.schedule_macrotask(say("Timer 2 still runs"), 0);
    el.log("Two timers scheduled");
    Ok(())
}

pub(super) fn unhandled_rejection(el: &mut EventLoop) -> Result<()> {
    el.log("Rejecting a promise nobody listens to...");
    Promise::rejected(el, Error::new("Nobody caught this 😱"));
    el.schedule_macrotask(say("The timer still fires"), 0);
    Ok(())
}

pub(super) fn uncaught(el: &mut EventLoop) -> Result<()> {
    el.log("Starting the morning routine...");
    el.schedule_macrotask(say("This timer never fires"), 0);

    let cup: Option<&str> = None;
    let cup = cup.ok_or_else(|| {
        Error::type_error("Cannot read properties of undefined (reading 'fill')")
    })?;
    el.log(format!("Filling the {}", cup));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_loop::Transcript;

    #[test]
    fn test_with_finally_cleans_up_after_early_return() {
        let transcript = Transcript::new();
        let mut el = EventLoop::with_reporter(transcript.clone());

        let outcome = with_finally(&mut el, |el| brew_and_serve(el, 0), switch_off);

        assert_eq!(outcome, Err(Error::new("No water in the tank")));
        assert_eq!(
            transcript.lines(),
            vec!["finally: switching the machine off 🔌"]
        );
    }

    #[test]
    fn test_with_finally_passes_value_through() {
        let transcript = Transcript::new();
        let mut el = EventLoop::with_reporter(transcript.clone());

        let outcome = with_finally(&mut el, |_| brew_with(100), switch_off);

        assert_eq!(outcome, Ok("100ml of coffee".to_string()));
        assert_eq!(
            transcript.lines(),
            vec!["finally: switching the machine off 🔌"]
        );
    }
}
