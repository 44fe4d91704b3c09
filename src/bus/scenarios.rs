//! End-to-end transactions through the simulated TWI peripheral.

use crate::bus::{
    BusAccess, CommandRequest, PageId, RegMut, RegisterFile, StatusCode,
    helpers::control_address,
    layout::control,
    protocol::BusState,
    system::Signals,
    test_support::{Nacked, SimController, test_storage, test_worker},
};

const STATUS: u8 = control_address(control::STATUS as u8);
const COMMAND: u8 = control_address(control::COMMAND as u8);
const PARAM0: u8 = control_address(control::PARAMS as u8);

fn async_handler(_: &CommandRequest, _: &dyn BusAccess) -> StatusCode {
    StatusCode::InProgress
}

#[test]
fn second_command_rejected_while_first_in_flight() {
    let mut regs = [0u8; 8];
    let mut storage = test_storage();
    let page = storage
        .register(RegisterFile::read_write(&mut regs).with_command_at(0))
        .unwrap();
    let handler = async_handler;
    let mut worker = test_worker(&storage);
    worker.register(0xF0, 0x10, &handler).unwrap();
    let mut controller = SimController::new();

    worker.bus().with_view(|view| assert!(view.select_page(page)));

    // Command A through the driver page's own command byte
    controller.write(&storage, &[0x00, 0x10]).unwrap();
    assert_eq!(worker.poll(), Some(StatusCode::InProgress));

    let status = controller.read_status(&storage).unwrap();
    assert_eq!(status.code(), Some(StatusCode::InProgress));
    assert!(status.is_busy());
    assert!(!status.has_bus_error());

    // Command B through the control page is refused
    controller.write(&storage, &[COMMAND, 0x11]).unwrap();
    assert_eq!(worker.poll(), None);

    let status = controller.read_status(&storage).unwrap();
    assert_eq!(status.code(), Some(StatusCode::InProgress));
    assert!(status.has_bus_error());
    worker.bus().with_view(|view| {
        assert_eq!(view.context().command(), 0x10);
        assert_eq!(view.context().last_page(), page);
    });

    // A finishes asynchronously; the bus-error flag stays until cleared
    worker.bus().update_status(StatusCode::Success);
    let status = controller.read_status(&storage).unwrap();
    assert_eq!(status.code(), Some(StatusCode::Success));
    assert!(status.has_bus_error());

    controller.write(&storage, &[STATUS, 0x00]).unwrap();
    assert_eq!(controller.read_status(&storage).unwrap().to_byte(), 0x00);
    worker
        .bus()
        .with_view(|view| assert_eq!(view.context().last_command(), 0x10));
}

#[test]
fn pending_command_refuses_next_address_phase() {
    let storage = test_storage();
    let mut controller = SimController::new();
    let mut worker = test_worker(&storage);

    controller.write(&storage, &[COMMAND, 0x09]).unwrap();
    assert_eq!(
        controller.write(&storage, &[COMMAND, 0x09]),
        Err(Nacked { at: 0 })
    );
    assert_eq!(controller.read_status(&storage), Err(Nacked { at: 0 }));

    worker.poll();
    assert!(controller.read_status(&storage).is_ok());
}

#[test]
fn wedged_worker_leaves_bus_nack_only_until_polled() {
    let storage = test_storage();
    let mut controller = SimController::new();

    controller.write(&storage, &[COMMAND, 0x09]).unwrap();
    for _ in 0..16 {
        let mut buf = [0u8; 2];
        assert_eq!(controller.read(&storage, &mut buf), Err(Nacked { at: 0 }));
    }
    storage
        .isr_bus()
        .with_view(|view| assert_eq!(view.state(), BusState::IoFinish));

    let mut worker = test_worker(&storage);
    assert_eq!(worker.poll(), Some(StatusCode::ErrorCommand));
    assert_eq!(
        controller.read_status(&storage).unwrap().code(),
        Some(StatusCode::ErrorCommand)
    );
}

#[test]
fn repeated_start_onto_second_page_leaves_no_stale_command() {
    let mut regs = [0u8; 4];
    let mut storage = test_storage();
    let page = storage
        .register(RegisterFile::read_write(&mut regs).with_command_at(0))
        .unwrap();
    let mut worker = test_worker(&storage);
    let mut controller = SimController::new();
    worker.bus().with_view(|view| assert!(view.select_page(page)));

    // Control command, then the driver page's own command byte after a
    // repeated start, all before one stop
    controller.start(&storage, false).unwrap();
    assert!(controller.send(&storage, COMMAND));
    assert!(controller.send(&storage, 0x09));
    controller.start(&storage, false).unwrap();
    assert!(controller.send(&storage, 0x00));
    assert!(controller.send(&storage, 0x10));
    assert!(controller.send(&storage, 0x55));
    controller.stop(&storage);

    assert_eq!(worker.poll(), Some(StatusCode::ErrorCommand));
    worker.bus().with_view(|view| {
        assert_eq!(view.context().last_command(), 0x09);
        assert_eq!(view.context().last_page(), PageId::CONTROL);
        view.with_page(PageId::CONTROL, |regs| {
            assert_eq!(regs.read_u8_at(control::COMMAND), 0);
        })
        .unwrap();
        view.with_page(page, |regs| assert_eq!(regs.read_u8_at(0), 0))
            .unwrap();
    });

    // Unrelated writes to either page post nothing
    controller.write(&storage, &[PARAM0 + 1, 0x05]).unwrap();
    assert_eq!(worker.poll(), None);
    controller.write(&storage, &[0x01, 0x66]).unwrap();
    assert_eq!(worker.poll(), None);
}

#[test]
fn offset_wraps_at_page_end() {
    let mut regs = [0u8; 4];
    let mut storage = test_storage();
    let page = storage.register(RegisterFile::read_write(&mut regs)).unwrap();
    let worker = test_worker(&storage);
    let mut controller = SimController::new();
    worker.bus().with_view(|view| assert!(view.select_page(page)));

    controller
        .write(&storage, &[0x03, 0xD3, 0xD0, 0xD1, 0xD2, 0xE3])
        .unwrap();

    let mut buf = [0u8; 5];
    controller.write_read(&storage, &[0x03], &mut buf).unwrap();
    assert_eq!(buf, [0xE3, 0xD0, 0xD1, 0xD2, 0xE3]);

    // A plain read continues from the wrapped cursor
    let mut next = [0u8; 1];
    controller.read(&storage, &mut next).unwrap();
    assert_eq!(next, [0xD0]);
}

#[test]
fn marker_selects_control_page_over_sticky_page() {
    let mut regs = [0u8; 8];
    let mut storage = test_storage();
    let page = storage.register(RegisterFile::read_write(&mut regs)).unwrap();
    let worker = test_worker(&storage);
    let mut controller = SimController::new();
    worker.bus().with_view(|view| assert!(view.select_page(page)));

    controller.write(&storage, &[PARAM0, 0x42]).unwrap();
    worker.bus().with_view(|view| {
        view.with_page(PageId::CONTROL, |regs| {
            assert_eq!(regs.read_u8_at(control::PARAMS), 0x42)
        })
        .unwrap();
        view.with_page(page, |regs| assert_eq!(regs.read_u8_at(3), 0))
            .unwrap();
        assert_eq!(view.session().active_page(), PageId::CONTROL);
        assert_eq!(view.session().page(), page);
    });

    controller.write(&storage, &[0x03, 0x42]).unwrap();
    worker.bus().with_view(|view| {
        view.with_page(page, |regs| assert_eq!(regs.read_u8_at(3), 0x42))
            .unwrap();
        assert_eq!(view.session().active_page(), page);
    });
}

#[test]
fn address_only_transaction_never_posts() {
    let mut regs = [0u8; 8];
    let mut storage = test_storage();
    let page = storage
        .register(RegisterFile::read_write(&mut regs).with_command_at(0))
        .unwrap();
    let mut worker = test_worker(&storage);
    let mut controller = SimController::new();
    worker.bus().with_view(|view| {
        assert!(view.select_page(page));
        view.with_page_mut(page, |mut regs| regs.write_u8_at(0, 0x09))
            .unwrap();
        view.with_page_mut(PageId::CONTROL, |mut regs| {
            regs.write_u8_at(control::COMMAND, 0x09)
        })
        .unwrap();
    });

    controller.write(&storage, &[0x00]).unwrap();
    controller.write(&storage, &[COMMAND]).unwrap();
    assert_eq!(worker.poll(), None);

    // The same stale byte posts once a payload byte lands
    controller.write(&storage, &[0x01, 0x00]).unwrap();
    assert_eq!(worker.poll(), Some(StatusCode::ErrorCommand));
}

#[test]
fn set_device_address_validates_and_skips_redundant_writes() {
    let storage = test_storage();
    let mut worker = test_worker(&storage);
    let mut controller = SimController::new();

    let mut run = |address: u8| {
        controller
            .write(&storage, &[COMMAND, 0x02, address])
            .unwrap();
        worker.poll()
    };

    assert_eq!(run(0x00), Some(StatusCode::ErrorArgument));
    assert_eq!(run(0x52), Some(StatusCode::ErrorArgument));
    assert_eq!(run(0xFF), Some(StatusCode::ErrorArgument));
    assert_eq!(run(0x41), Some(StatusCode::Success));
    assert_eq!(run(0x41), Some(StatusCode::Success));
    drop(run);

    assert_eq!(worker.store().writes, 1);
    assert_eq!(worker.boot_address(), 0x41);

    controller.write(&storage, &[COMMAND, 0x02, 0x43]).unwrap();
    assert_eq!(worker.poll(), Some(StatusCode::Success));
    assert_eq!(worker.store().writes, 2);
}

#[test]
fn boot_address_falls_back_to_default() {
    let storage = test_storage();
    let mut worker = test_worker(&storage);
    assert_eq!(worker.boot_address(), storage.default_address());
}

#[test]
fn set_page_end_to_end() {
    let mut regs = [0u8; 4];
    let mut storage = test_storage();
    let page = storage.register(RegisterFile::read_write(&mut regs)).unwrap();
    let mut worker = test_worker(&storage);
    let mut controller = SimController::new();

    controller
        .write(&storage, &[COMMAND, 0x01, page.0])
        .unwrap();
    worker.poll();
    let status = controller.read_status(&storage).unwrap();
    assert_eq!(status.code(), Some(StatusCode::Success));
    assert!(!status.is_busy());

    // The sticky page now serves unmarked addresses
    controller.write(&storage, &[0x00, 0x77]).unwrap();
    worker.bus().with_view(|view| {
        view.with_page(page, |regs| assert_eq!(regs.read_u8_at(0), 0x77))
            .unwrap()
    });

    for bad in [0x00, 0x03, 0x80] {
        controller.write(&storage, &[COMMAND, 0x01, bad]).unwrap();
        worker.poll();
        assert_eq!(
            controller.read_status(&storage).unwrap().code(),
            Some(StatusCode::ErrorArgument)
        );
    }
    worker
        .bus()
        .with_view(|view| assert_eq!(view.session().page(), page));
}

#[test]
fn unregistered_extension_command_reports_error_command() {
    let storage = test_storage();
    let mut worker = test_worker(&storage);
    let mut controller = SimController::new();

    controller.write(&storage, &[COMMAND, 0x09]).unwrap();
    assert_eq!(worker.poll(), Some(StatusCode::ErrorCommand));
    assert_eq!(controller.read_status(&storage).unwrap().to_byte(), 0x40);

    // Reserved core codes without a meaning are refused the same way
    controller.write(&storage, &[COMMAND, 0x05]).unwrap();
    assert_eq!(worker.poll(), Some(StatusCode::ErrorCommand));
}

#[test]
fn extension_command_reaches_registered_handler() {
    let seen = core::cell::Cell::new(0u8);
    let handler = |request: &CommandRequest, bus: &dyn BusAccess| {
        seen.set(request.params[0]);
        bus.with_page(PageId::CONTROL, &mut |mut regs: RegMut<'_>| {
            regs.write_u8_at(control::PARAMS + 1, 0x99)
        })
        .map_or(StatusCode::ErrorAccess, |_| StatusCode::Success)
    };
    let storage = test_storage();
    let mut worker = test_worker(&storage);
    worker.register(0xFF, 0x20, &handler).unwrap();
    let mut controller = SimController::new();

    controller.write(&storage, &[COMMAND, 0x20, 0x05]).unwrap();
    assert_eq!(worker.poll(), Some(StatusCode::Success));
    assert_eq!(seen.get(), 0x05);

    let mut buf = [0u8; 1];
    controller
        .write_read(&storage, &[control_address(4)], &mut buf)
        .unwrap();
    assert_eq!(buf, [0x99]);
}

#[test]
fn write_then_read_posts_at_final_stop() {
    let mut regs = [0u8; 4];
    let mut storage = test_storage();
    let page = storage.register(RegisterFile::read_write(&mut regs)).unwrap();
    let mut worker = test_worker(&storage);
    let mut controller = SimController::new();

    let mut buf = [0u8; 1];
    controller
        .write_read(&storage, &[COMMAND, 0x01, page.0], &mut buf)
        .unwrap();
    assert_eq!(worker.poll(), Some(StatusCode::Success));
}

#[test]
fn device_info_is_read_only_on_the_wire() {
    let storage = test_storage();
    let mut controller = SimController::new();

    // Sticky page starts at device info
    let mut info = [0u8; 6];
    controller.write_read(&storage, &[0x00], &mut info).unwrap();
    assert_eq!(info, [0xAA, 0xBA, 0x12, 0x28, 0x01, 0x00]);

    assert_eq!(
        controller.write(&storage, &[0x00, 0x55]),
        Err(Nacked { at: 2 })
    );
    assert_eq!(
        controller.write(&storage, &[0x06]),
        Err(Nacked { at: 1 })
    );
}

#[test]
fn stop_raises_worker_signals() {
    let storage = test_storage();
    let mut controller = SimController::new();

    controller.start(&storage, false).unwrap();
    controller.send(&storage, COMMAND);
    assert_eq!(storage.signal().take(), Signals::WAKE_LOCK);

    controller.stop(&storage);
    assert!(
        storage
            .signal()
            .take()
            .contains(Signals::WAKE_LOCK | Signals::WORKER_PENDING)
    );
}

#[test]
#[should_panic(expected = "restart requested")]
fn reset_command_restarts() {
    let storage = test_storage();
    let mut worker = test_worker(&storage);
    let mut controller = SimController::new();

    controller.write(&storage, &[COMMAND, 0x03]).unwrap();
    worker.poll();
}
